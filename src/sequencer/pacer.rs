use async_trait::async_trait;
use std::time::Duration;

/// Holds the sequence for a while without touching any device. Used to keep
/// exposure timing realistic when running without the sensor.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn hold(&self, duration: Duration);
}

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn hold(&self, duration: Duration) { tokio::time::sleep(duration).await; }
}
