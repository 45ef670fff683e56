use csv::WriterBuilder;

use crate::schedule::{timestamp, Availability, Schedule};

/// Renders every response of a schedule as CSV
///
/// Columns: participant name, one glyph column per candidate (in candidate
/// order), comment, last update.
pub fn export_responses_to_csv(schedule: &Schedule) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(Vec::new());

    let mut header = Vec::with_capacity(schedule.candidates.len() + 3);
    header.push("name");
    header.extend(schedule.candidates.iter().map(String::as_str));
    header.push("comment");
    header.push("updatedAt");
    wtr.write_record(&header)?;

    for response in &schedule.responses {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        row.push(response.name.clone());
        for candidate in &schedule.candidates {
            let answer: Availability = response.answers.get(candidate).copied().unwrap_or_default();
            row.push(answer.symbol().to_string());
        }
        row.push(response.comment.clone().unwrap_or_default());
        row.push(timestamp::format(&response.updated_at));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ParticipantResponse;
    use chrono::{TimeZone, Utc};

    #[test]
    fn one_row_per_response_with_glyphs() {
        let updated = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let schedule = Schedule {
            id: "s1".to_string(),
            title: "Sync".to_string(),
            description: None,
            candidates: vec![
                "2025-01-01T10:00:00.000Z".to_string(),
                "2025-01-02T09:00:00.000Z".to_string(),
            ],
            created_at: updated,
            responses: vec![ParticipantResponse {
                id: "r1".to_string(),
                name: "Alice, Jr.".to_string(),
                comment: Some("ok".to_string()),
                answers: [("2025-01-01T10:00:00.000Z".to_string(), Availability::Maybe)]
                    .into_iter()
                    .collect(),
                created_at: None,
                updated_at: updated,
            }],
        };

        let csv = String::from_utf8(export_responses_to_csv(&schedule).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "name,2025-01-01T10:00:00.000Z,2025-01-02T09:00:00.000Z,comment,updatedAt"
        );
        assert_eq!(lines[1], "\"Alice, Jr.\",△,✕,ok,2025-01-01T12:00:00.000Z");
        assert_eq!(lines.len(), 2);
    }
}
