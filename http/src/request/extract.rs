use std::ops::Deref;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use kit_validator::Validate;
use serde::de::DeserializeOwned;

use super::{ReadError, Reader, RequestError};

fn reader(req: &HttpRequest) -> Result<Reader, RequestError> {
    match req.app_data::<web::Data<Reader>>() {
        Some(reader) => Ok(reader.get_ref().clone()),
        None => {
            log::error!(path = req.path(); "Reader is not registered as app data");
            Err(ReadError::internal().into())
        }
    }
}

macro_rules! extractor {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name<T>(pub T);

        impl<T> $name<T> {
            pub fn into_inner(self) -> T {
                self.0
            }
        }

        impl<T> Deref for $name<T> {
            type Target = T;

            fn deref(&self) -> &T {
                &self.0
            }
        }
    };
}

extractor! {
    /// A JSON body, decoded and validated with the app's [`Reader`].
    ValidatedJson
}

extractor! {
    /// An urlencoded form body, decoded and validated with the app's [`Reader`].
    ValidatedForm
}

extractor! {
    /// The query string, decoded and validated with the app's [`Reader`].
    ValidatedQuery
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = RequestError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let reader = reader(req);
        let payload = payload.take();

        Box::pin(async move {
            let value = reader?.typed::<T>().read_and_validate_json(payload).await?;
            Ok(ValidatedJson(value))
        })
    }
}

impl<T> FromRequest for ValidatedForm<T>
where
    T: DeserializeOwned + Validate + 'static,
{
    type Error = RequestError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let reader = reader(&req);
        let payload = payload.take();

        Box::pin(async move {
            let value = reader?
                .typed::<T>()
                .read_and_validate_form(&req, payload)
                .await?;
            Ok(ValidatedForm(value))
        })
    }
}

impl<T> FromRequest for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
{
    type Error = RequestError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = reader(req)
            .and_then(|reader| reader.typed::<T>().read_and_validate_query(req))
            .map(ValidatedQuery);
        ready(result)
    }
}
