//! The payer capability.
//!
//! A [`Payer`] receives the ordered [`PaymentOption`]s derived from a
//! challenge, decides which one to pay, performs the transfer and returns a
//! proof-of-payment token (typically a transaction hash). Wallets, signing
//! and the transfer itself live entirely behind this trait.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::PayerError;
use crate::proto::PaymentOption;

/// A boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Pays for a resource and returns a proof-of-payment token.
///
/// Implementations may take arbitrary time. The interceptor awaits the
/// returned future exactly once per 402 and never retries it.
pub trait Payer: Send + Sync {
    /// Pays using one of `options` for `resource`.
    ///
    /// `options` is never empty and is ordered by preference of the server:
    /// the native `PAY` option first when present.
    ///
    /// # Errors
    ///
    /// Returns [`PayerError`] when the payment cannot be made. The error is
    /// surfaced to the caller in place of the 402 response.
    fn pay<'a>(
        &'a self,
        options: &'a [PaymentOption],
        resource: &'a str,
    ) -> BoxFuture<'a, Result<String, PayerError>>;
}

/// A [`Payer`] backed by an async closure. Created by [`from_fn`].
#[derive(Clone, Copy)]
pub struct FnPayer<F> {
    f: F,
}

impl<F> fmt::Debug for FnPayer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPayer").field("f", &"<fn>").finish()
    }
}

/// Wraps an async closure as a [`Payer`].
///
/// The closure receives owned copies of the options and resource URL.
///
/// ```
/// use pay402::payer::{Payer, from_fn};
/// use pay402::{PayerError, PaymentOption};
///
/// let payer = from_fn(|options: Vec<PaymentOption>, _resource: String| async move {
///     let option = options.first().ok_or(PayerError::rejected("nothing to pay"))?;
///     Ok(format!("paid {} {}", option.amount, option.currency))
/// });
/// # fn assert_payer(_: &impl Payer) {}
/// # assert_payer(&payer);
/// ```
pub const fn from_fn<F, Fut>(f: F) -> FnPayer<F>
where
    F: Fn(Vec<PaymentOption>, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, PayerError>> + Send + 'static,
{
    FnPayer { f }
}

impl<F, Fut> Payer for FnPayer<F>
where
    F: Fn(Vec<PaymentOption>, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, PayerError>> + Send + 'static,
{
    fn pay<'a>(
        &'a self,
        options: &'a [PaymentOption],
        resource: &'a str,
    ) -> BoxFuture<'a, Result<String, PayerError>> {
        Box::pin((self.f)(options.to_vec(), resource.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_fn_payer_receives_options_and_resource() {
        let payer = from_fn(|options: Vec<PaymentOption>, resource: String| async move {
            Ok(format!("{}:{}:{resource}", options.len(), options[0].currency))
        });

        let options = vec![
            PaymentOption::new("0.066", "PAY", "0x37ff"),
            PaymentOption::new("14000", "USD Coin", "0x37ff"),
        ];
        let token = payer
            .pay(&options, "https://api.example.com/data")
            .await
            .unwrap();
        assert_eq!(token, "2:PAY:https://api.example.com/data");
    }

    #[tokio::test]
    async fn test_fn_payer_propagates_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let payer = from_fn(move |_options: Vec<PaymentOption>, _resource: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(PayerError::rejected("insufficient balance")) }
        });

        let options = vec![PaymentOption::new("1", "PAY", "0x37ff")];
        let err = payer.pay(&options, "r").await.unwrap_err();
        assert!(matches!(
            err,
            PayerError::Rejected(ref reason) if reason == "insufficient balance"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dyn_compatible() {
        let payer: Arc<dyn Payer> = Arc::new(from_fn(|_: Vec<PaymentOption>, _: String| async {
            Ok(String::new())
        }));
        assert_eq!(Arc::strong_count(&payer), 1);
    }
}
