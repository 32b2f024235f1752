//! Wire types shared by the searchads client crates
//!
//! This crate holds the JSON shapes exchanged with the remote campaign
//! management API and its OAuth2 token endpoint. It performs no I/O.
//!
//! # Type Organization
//!
//! - **Selectors**: [`selector`] - filter/sort/paginate descriptors for `/find` endpoints
//! - **Envelopes**: [`envelope`] - `{data, pagination, error}` response wrappers
//! - **Errors**: [`error`] - structured error entries returned by the API
//! - **OAuth2**: [`oauth`] - client-credentials token request and responses
//!
//! # Usage
//!
//! ```rust
//! use searchads_protocol::{ApiListResponse, Selector, Pagination};
//!
//! let selector = Selector::default().with_pagination(Pagination::new(0, 50));
//! let body = serde_json::to_string(&selector).unwrap();
//! assert_eq!(body, r#"{"pagination":{"offset":0,"limit":50}}"#);
//!
//! let page: ApiListResponse<serde_json::Value> =
//!     serde_json::from_str(r#"{"data":[{"id":1}],"pagination":{"totalResults":1,"startIndex":0,"itemsPerPage":1}}"#)
//!         .unwrap();
//! assert_eq!(page.data.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod oauth;
pub mod selector;

pub use envelope::{ApiListResponse, ApiResponse, PageDetail};
pub use error::{ErrorDetail, ErrorEnvelope};
pub use oauth::{OAuthErrorResponse, TokenRequest, TokenResponse};
pub use selector::{Condition, Pagination, SortOrder, Selector, Sorting};
