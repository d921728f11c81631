use crate::application::services::report_service::ReportService;
use crate::domain::repositories::credential_store::CredentialStore;
use crate::domain::repositories::oauth_provider::OAuthProvider;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportService>,
    pub oauth: Arc<dyn OAuthProvider>,
    pub credentials: Arc<dyn CredentialStore>,
    /// Base URL the OAuth callback redirects the browser to
    pub frontend_url: String,
}
