use crate::route::RouteKind;
use micro_crud_web::RouteError;
use thiserror::Error;

/// The only precondition checked on the options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No baseUrl found")]
    MissingBaseUrl,
}

/// Errors reported by [`register`](crate::register).
#[derive(Error, Debug)]
pub enum CrudError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to register {kind} route: {source}")]
    Host {
        kind: RouteKind,
        #[source]
        source: RouteError,
    },
}

impl CrudError {
    pub fn host(kind: RouteKind, source: RouteError) -> Self {
        Self::Host { kind, source }
    }
}
