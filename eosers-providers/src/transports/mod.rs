mod common;
pub use common::{ApiError, ApiErrorDetail, ApiErrorInfo};

mod http;
pub use self::http::{ClientError as HttpClientError, Provider as Http};

mod mock;
pub use mock::{MockError, MockProvider, MockResponse};
