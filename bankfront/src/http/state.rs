use crate::backend::BackendClient;
use crate::session::SessionCookie;

#[derive(Debug, Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub session: SessionCookie,
    /// Gate the account list behind a session like the detail page.
    pub protect_accounts: bool,
}
