/// Router Module Index
///
/// One router per resource gateway, each mounted under `/api` by
/// `create_router`. Access control is applied per route: protected handlers
/// take the `AuthUser` extractor as an argument, so a request that fails
/// verification is rejected before any handler logic runs.
pub mod banner;
pub mod producto;
pub mod service;
pub mod user;
