use env_logger::Builder;
use lazy_static::lazy_static;
use log::{info, LevelFilter};
use std::env;

lazy_static! {
    pub static ref DATA_PATH: String =
        env::var("GALLERY_DATA_PATH").unwrap_or_else(|_| "data.json".to_string());
    pub static ref STORE_PATH: String =
        env::var("GALLERY_STORE_PATH").unwrap_or_else(|_| "gallery_store.json".to_string());
}

fn logger_builder() -> Builder {
    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    builder
}

pub fn init_logger() {
    logger_builder().parse_default_env().init();
    info!("Starting video gallery...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_message_passes_the_default_filter() {
        assert!(logger_builder().build().filter() >= LevelFilter::Info);
    }
}
