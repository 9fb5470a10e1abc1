/// User agent reported by every request from this crate.
pub const USER_AGENT: &str = concat!("hirelane-api-client/", env!("CARGO_PKG_VERSION"));

/// Default transport for [`Client`](crate::Client).
///
/// The cookie jar is enabled so the http-only refresh credential set at
/// login accompanies the refresh call without ever being readable here.
pub fn create_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .build()
    {
        Ok(client) => client,
        Err(err) => panic!("failed to construct http client: {err}"),
    }
}
