use std::future::Future;

use crate::ResultRecord;

pub mod postgres;

pub trait DataStore {
    fn find_result(
        &self,
        video_id: &str,
    ) -> impl Future<Output = anyhow::Result<Option<ResultRecord>>> + Send;

    fn upsert_result(
        &self,
        record: &ResultRecord,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn delete_result(&self, video_id: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl<T: DataStore + Send + Sync> DataStore for &T {
    async fn find_result(&self, video_id: &str) -> anyhow::Result<Option<ResultRecord>> {
        (**self).find_result(video_id).await
    }

    async fn upsert_result(&self, record: &ResultRecord) -> anyhow::Result<()> {
        (**self).upsert_result(record).await
    }

    async fn delete_result(&self, video_id: &str) -> anyhow::Result<()> {
        (**self).delete_result(video_id).await
    }
}
