use crate::kind::LifecycleStatus;
use serde::{Deserialize, Serialize};

/// Primary lifecycle status of a training job.
///
/// Values the client does not recognize are kept verbatim in `Unknown` and
/// treated as non-terminal, so a newer control plane cannot end a wait early.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrainingJobStatus {
    InProgress,
    Completed,
    Failed,
    Stopping,
    Stopped,
    Unknown(String),
}

impl TrainingJobStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InProgress => "InProgress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for TrainingJobStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "InProgress" => Self::InProgress,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            "Stopping" => Self::Stopping,
            "Stopped" => Self::Stopped,
            _ => Self::Unknown(value),
        }
    }
}

impl From<TrainingJobStatus> for String {
    fn from(value: TrainingJobStatus) -> Self {
        match value {
            TrainingJobStatus::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for TrainingJobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LifecycleStatus for TrainingJobStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Stopped)
    }

    fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Detailed progress reported alongside the primary status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SecondaryStatus {
    Starting,
    LaunchingMlInstances,
    PreparingTrainingStack,
    Downloading,
    DownloadingTrainingImage,
    Training,
    Uploading,
    Completed,
    Failed,
    Stopping,
    Stopped,
    MaxRuntimeExceeded,
    Interrupted,
    Unknown(String),
}

impl SecondaryStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Starting => "Starting",
            Self::LaunchingMlInstances => "LaunchingMLInstances",
            Self::PreparingTrainingStack => "PreparingTrainingStack",
            Self::Downloading => "Downloading",
            Self::DownloadingTrainingImage => "DownloadingTrainingImage",
            Self::Training => "Training",
            Self::Uploading => "Uploading",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::MaxRuntimeExceeded => "MaxRuntimeExceeded",
            Self::Interrupted => "Interrupted",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for SecondaryStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Starting" => Self::Starting,
            "LaunchingMLInstances" => Self::LaunchingMlInstances,
            "PreparingTrainingStack" => Self::PreparingTrainingStack,
            "Downloading" => Self::Downloading,
            "DownloadingTrainingImage" => Self::DownloadingTrainingImage,
            "Training" => Self::Training,
            "Uploading" => Self::Uploading,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            "Stopping" => Self::Stopping,
            "Stopped" => Self::Stopped,
            "MaxRuntimeExceeded" => Self::MaxRuntimeExceeded,
            "Interrupted" => Self::Interrupted,
            _ => Self::Unknown(value),
        }
    }
}

impl From<SecondaryStatus> for String {
    fn from(value: SecondaryStatus) -> Self {
        match value {
            SecondaryStatus::Unknown(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for SecondaryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TrainingJobStatus::Completed.is_terminal());
        assert!(TrainingJobStatus::Failed.is_terminal());
        assert!(TrainingJobStatus::Stopped.is_terminal());
        assert!(!TrainingJobStatus::InProgress.is_terminal());
        assert!(!TrainingJobStatus::Stopping.is_terminal());
        assert!(TrainingJobStatus::Failed.is_failed());
        assert!(!TrainingJobStatus::Stopped.is_failed());
    }

    #[test]
    fn test_unknown_status_is_preserved_and_not_terminal() {
        let status: TrainingJobStatus = serde_json::from_str(r#""Paused""#).unwrap();
        assert_eq!(status, TrainingJobStatus::Unknown("Paused".to_string()));
        assert!(!status.is_terminal());
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""Paused""#);
    }

    #[test]
    fn test_secondary_status_wire_names() {
        let s: SecondaryStatus = serde_json::from_str(r#""LaunchingMLInstances""#).unwrap();
        assert_eq!(s, SecondaryStatus::LaunchingMlInstances);
        assert_eq!(s.to_string(), "LaunchingMLInstances");
    }
}
