//! Teacher configs and student results.

use crate::domain::{StudentResult, TeacherConfig};
use crate::error::Result;
use crate::store::{RecordStore, Served};

impl RecordStore {
    pub async fn list_teacher_configs(&self) -> Served<Vec<TeacherConfig>> {
        self.list::<TeacherConfig>().await
    }

    /// Save a config, replacing any existing one for the same
    /// (subject, bimester).
    pub async fn save_teacher_config(&self, config: TeacherConfig) -> Result<Served<()>> {
        self.save(config).await
    }

    /// The config for one (subject, bimester), if any.
    pub async fn find_teacher_config(
        &self,
        subject: &str,
        bimester: &str,
    ) -> Served<Option<TeacherConfig>> {
        self.list_teacher_configs()
            .await
            .map(|configs| configs.into_iter().find(|c| c.is_for(subject, bimester)))
    }

    pub async fn list_student_results(&self) -> Served<Vec<StudentResult>> {
        self.list::<StudentResult>().await
    }

    /// Append a result. Results are never replaced.
    pub async fn save_student_result(&self, result: StudentResult) -> Result<Served<()>> {
        self.save(result).await
    }
}
