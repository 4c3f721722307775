/// Generate client methods with oneshot channel boilerplate and automatic tracing.
///
/// A closed mailbox means the service was never started or has shut down,
/// which surfaces as [`CartError::OutOfScope`](crate::cart_actor::CartError::OutOfScope).
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $crate::cart_actor::CartError> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| $crate::cart_actor::CartError::OutOfScope(
                        "cart service is not running".to_string(),
                    ))?;

                response
                    .await
                    .map_err(|e| $crate::cart_actor::CartError::ActorCommunicationError(e.to_string()))?
            }
        }
    };
}
