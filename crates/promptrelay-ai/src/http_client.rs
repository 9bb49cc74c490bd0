use std::time::Duration;

use reqwest::Client;

const DISABLE_SYSTEM_PROXY_ENV: &str = "PROMPTRELAY_DISABLE_SYSTEM_PROXY";

pub(crate) fn build_http_client(read_timeout: Option<Duration>) -> Client {
    let mut builder = Client::builder();
    if let Some(timeout) = read_timeout {
        builder = builder.read_timeout(timeout);
    }
    if should_disable_system_proxy() {
        builder = builder.no_proxy();
    }
    builder.build().expect("Failed to build reqwest client")
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}
