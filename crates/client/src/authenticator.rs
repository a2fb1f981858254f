use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, error, info};
use uploader_model::{Credentials, Registration};
use uploader_transfer::HttpResponse;

use crate::BoxFuture;
use crate::config::ClientConfig;
use crate::endpoint::Endpoints;
use crate::error::{ErrorKind, Failure, Fatal, LoginError, RegistrationError};
use crate::fault;
use crate::http::HttpConnection;
use crate::response::{Classified, Outcome, classify};

/// Exchanges credentials for a bearer token and registers new accounts.
pub trait Authenticator: Send + Sync {
    /// Logs in and returns the token to pass to the uploader.
    fn authenticate<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<String, LoginError>>;

    /// Creates a new account.
    fn register<'a>(
        &'a self,
        registration: &'a Registration,
    ) -> BoxFuture<'a, Result<Outcome, RegistrationError>>;

    fn login_endpoint(&self) -> Result<Url, Fatal>;

    fn registration_endpoint(&self) -> Result<Url, Fatal>;
}

/// [`Authenticator`] talking to the collector's `login` and `user` endpoints.
#[derive(Debug, Clone)]
pub struct DefaultAuthenticator {
    endpoints: Endpoints,
    http: HttpConnection,
}

impl DefaultAuthenticator {
    pub fn new(config: &ClientConfig) -> Result<Self, Fatal> {
        Ok(Self {
            endpoints: Endpoints::new(&config.api_endpoint)?,
            http: HttpConnection::new(config)?,
        })
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, LoginError> {
        let url = self.endpoints.login()?;
        let payload = Credentials::new(username, password)
            .to_json()
            .map_err(|e| Fatal::ClientSetup(e.to_string()))?;

        let response = match self.http.open(url).post_json(&payload).await {
            Ok(r) => r,
            Err(e) => return Err(fault::translate(e)?.into()),
        };

        match classify(&response) {
            Classified::Success(Outcome::LoginSuccessful) => {
                let token = bearer_token(&response).ok_or_else(|| {
                    error!("login successful but response carries no token");
                    Fatal::MissingToken
                })?;
                info!(username, "login successful");
                Ok(token)
            }
            Classified::Success(other) => Err(unexpected_success(other, &response).into()),
            Classified::Recoverable(failure) => match failure.kind() {
                ErrorKind::BadRequest
                | ErrorKind::Conflict
                | ErrorKind::EntityNotParsable
                | ErrorKind::InternalServerError
                | ErrorKind::UploadSessionExpired => {
                    error!(kind = %failure.kind(), "login failed hard");
                    Err(Fatal::UnexpectedKind(failure).into())
                }
                _ => Err(failure.into()),
            },
            Classified::Fatal(fatal) => Err(fatal.into()),
        }
    }

    async fn create_account(
        &self,
        registration: &Registration,
    ) -> Result<Outcome, RegistrationError> {
        let url = self.endpoints.registration()?;
        let payload = registration
            .to_json()
            .map_err(|e| Fatal::ClientSetup(e.to_string()))?;

        let response = match self.http.open(url).post_json(&payload).await {
            Ok(r) => r,
            Err(e) => return Err(fault::translate(e)?.into()),
        };

        match classify(&response) {
            Classified::Success(outcome) => {
                info!(email = %registration.email, ?outcome, "registration accepted");
                Ok(outcome)
            }
            Classified::Recoverable(failure) => match failure.kind() {
                ErrorKind::BadRequest
                | ErrorKind::Unauthorized
                | ErrorKind::EntityNotParsable
                | ErrorKind::InternalServerError
                | ErrorKind::AccountNotActivated
                | ErrorKind::UploadSessionExpired => {
                    error!(kind = %failure.kind(), "registration failed hard");
                    Err(Fatal::UnexpectedKind(failure).into())
                }
                _ => Err(failure.into()),
            },
            Classified::Fatal(fatal) => Err(fatal.into()),
        }
    }
}

impl Authenticator for DefaultAuthenticator {
    fn authenticate<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<String, LoginError>> {
        Box::pin(self.login(username, password))
    }

    fn register<'a>(
        &'a self,
        registration: &'a Registration,
    ) -> BoxFuture<'a, Result<Outcome, RegistrationError>> {
        Box::pin(self.create_account(registration))
    }

    fn login_endpoint(&self) -> Result<Url, Fatal> {
        self.endpoints.login()
    }

    fn registration_endpoint(&self) -> Result<Url, Fatal> {
        self.endpoints.registration()
    }
}

/// Token from the `Authorization` header, without a `Bearer ` prefix.
fn bearer_token(response: &HttpResponse) -> Option<String> {
    let value = response.header(AUTHORIZATION)?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn unexpected_success(outcome: Outcome, response: &HttpResponse) -> Fatal {
    debug!(?outcome, status = response.status, "success status not expected for login");
    Fatal::UnexpectedKind(
        Failure::new(ErrorKind::UnexpectedResponseCode)
            .with_message(format!("{} {}", response.status, response.message)),
    )
}
