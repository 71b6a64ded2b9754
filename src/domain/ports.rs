use crate::utils::error::Result;

/// Destination the static build writes its output files into.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Remove everything previously written.
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}
