use tweet_harvest::error::AuthError;

fn main() {
    if let Err(err) = tweet_harvest::run() {
        if let Some(auth) = err.downcast_ref::<AuthError>() {
            eprintln!("Error authenticating, check credentials. Exiting program. ({auth})");
            std::process::exit(3);
        }
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
