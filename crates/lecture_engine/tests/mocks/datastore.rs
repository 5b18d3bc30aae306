use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use lecture_datastore::{DataStore, ResultRecord};

#[derive(Clone, Default)]
pub struct MockDataStore {
    pub records: Arc<Mutex<HashMap<String, ResultRecord>>>,
    pub fail_reads: Option<String>,
    pub fail_writes: Option<String>,
}

impl MockDataStore {
    pub fn failing_reads(msg: &str) -> Self {
        Self {
            fail_reads: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn failing_writes(msg: &str) -> Self {
        Self {
            fail_writes: Some(msg.to_string()),
            ..Default::default()
        }
    }

    /// Rewrites a record's creation time, for freshness-window tests.
    pub fn backdate(&self, video_id: &str, age: chrono::Duration) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(video_id) {
            record.created_at = chrono::Utc::now() - age;
        }
    }
}

impl DataStore for MockDataStore {
    async fn find_result(&self, video_id: &str) -> anyhow::Result<Option<ResultRecord>> {
        if let Some(ref msg) = self.fail_reads {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.records.lock().unwrap().get(video_id).cloned())
    }

    async fn upsert_result(&self, record: &ResultRecord) -> anyhow::Result<()> {
        if let Some(ref msg) = self.fail_writes {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.records
            .lock()
            .unwrap()
            .insert(record.video_id.clone(), record.clone());
        Ok(())
    }

    async fn delete_result(&self, video_id: &str) -> anyhow::Result<()> {
        if let Some(ref msg) = self.fail_writes {
            return Err(anyhow::anyhow!("{}", msg));
        }
        self.records.lock().unwrap().remove(video_id);
        Ok(())
    }
}
