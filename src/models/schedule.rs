use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: String,
    #[serde(default)]
    pub times: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleInput {
    pub date: Option<String>,
    pub times: Option<Vec<String>>,
}

impl ScheduleInput {
    /// Date is the upsert key and must be present; blank slots are dropped.
    pub fn into_entry(self) -> Option<ScheduleEntry> {
        let date = self.date.map(|d| d.trim().to_string()).filter(|d| !d.is_empty())?;
        let times = self
            .times
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Some(ScheduleEntry { date, times })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTimes {
    pub available_times: Vec<String>,
}
