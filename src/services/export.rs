// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! XML export of an account's full activity history.
//!
//! The document references the `meno-stats.xsl` stylesheet and is served as
//! an ISO-8859-1 download named `account_{aid}.xml`.

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::Activity;

/// Rendered export, ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub filename: String,
    /// ISO-8859-1 encoded XML
    pub body: Vec<u8>,
}

/// Serializes account histories.
pub struct ActivityExporter {
    db: Db,
}

impl ActivityExporter {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Export every activity of an account.
    pub async fn export_account(&self, account_id: u64) -> Result<ExportDocument> {
        let account = self
            .db
            .get_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", account_id)))?;

        let activities = self.db.get_activities_for_account(account.account_id).await?;
        tracing::info!(
            account_id,
            activities = activities.len(),
            "Exporting account activity"
        );

        let xml = render_document(account.account_id, &activities);
        Ok(ExportDocument {
            filename: format!("account_{}.xml", account.account_id),
            body: encode_latin1(&xml),
        })
    }
}

/// Render the export XML.
///
/// Activities are grouped by (character id, world) in order of first
/// appearance; each group keeps the activities' own order.
pub fn render_document(account_id: u64, activities: &[Activity]) -> String {
    let mut groups: Vec<((u64, &str), Vec<&Activity>)> = Vec::new();
    for activity in activities {
        let key = (activity.character_id, activity.world.as_str());
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(activity),
            None => groups.push((key, vec![activity])),
        }
    }

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"ISO-8859-1\" ?>\n");
    xml.push_str("<?xml-stylesheet type=\"text/xsl\" href=\"meno-stats.xsl\"?>\n");
    xml.push_str("<stats>\n");
    xml.push_str(&format!("  <account><aid>{}</aid></account>\n", account_id));

    for ((character_id, world), group) in &groups {
        xml.push_str(&format!(
            "  <character><cid>{}</cid><world>{}</world>\n",
            character_id,
            escape_xml(world)
        ));
        for activity in group {
            xml.push_str(&format!(
                "    <activity date=\"{}\">{}</activity>\n",
                activity.date.format("%d-%m-%Y"),
                activity.bitmap.to_bit_string()
            ));
        }
        xml.push_str("  </character>\n");
    }

    xml.push_str("</stats>\n");
    xml
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Encode as ISO-8859-1, writing characters outside Latin-1 as numeric
/// character references.
fn encode_latin1(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match u8::try_from(u32::from(ch)) {
            Ok(byte) => out.push(byte),
            Err(_) => out.extend_from_slice(format!("&#{};", u32::from(ch)).as_bytes()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CharacterKey;
    use chrono::NaiveDate;

    fn activity(cid: u64, world: &str, day: u32, minutes: &[usize]) -> Activity {
        let key = CharacterKey::new(42, cid, world);
        let mut activity = Activity::new(&key, NaiveDate::from_ymd_opt(2023, 2, day).unwrap());
        for &m in minutes {
            activity.bitmap.set_minute(m).unwrap();
        }
        activity
    }

    #[test]
    fn test_two_characters_one_day_each() {
        let activities = vec![activity(1, "tarhuna", 3, &[0]), activity(2, "tarhuna", 3, &[])];
        let xml = render_document(42, &activities);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"ISO-8859-1\" ?>\n"));
        assert!(xml.contains("<?xml-stylesheet type=\"text/xsl\" href=\"meno-stats.xsl\"?>"));
        assert!(xml.contains("<account><aid>42</aid></account>"));
        assert_eq!(xml.matches("<character>").count(), 2);
        assert_eq!(xml.matches("<activity ").count(), 2);
        assert!(xml.contains("<cid>1</cid><world>tarhuna</world>"));
        assert!(xml.contains("<activity date=\"03-02-2023\">1000"));
    }

    #[test]
    fn test_bit_string_length() {
        let xml = render_document(42, &[activity(1, "a", 1, &[1439])]);
        let start = xml.find("\">").unwrap() + 2;
        let end = xml.find("</activity>").unwrap();
        let bits = &xml[start..end];

        assert_eq!(bits.len(), 1440);
        assert!(bits.ends_with('1'));
        assert!(bits.chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn test_groups_by_character_and_world_in_first_seen_order() {
        let activities = vec![
            activity(7, "beta", 1, &[]),
            activity(7, "alpha", 1, &[]),
            activity(7, "beta", 2, &[]),
        ];
        let xml = render_document(42, &activities);

        let beta = xml.find("<world>beta</world>").unwrap();
        let alpha = xml.find("<world>alpha</world>").unwrap();
        assert!(beta < alpha);
        assert_eq!(xml.matches("<character>").count(), 2);

        // Both beta days sit inside the beta block
        let beta_block = &xml[beta..alpha];
        assert!(beta_block.contains("date=\"01-02-2023\""));
        assert!(beta_block.contains("date=\"02-02-2023\""));
    }

    #[test]
    fn test_full_document_layout() {
        let xml = render_document(42, &[activity(5, "a&b", 9, &[])]);
        let expected = format!(
            "<?xml version=\"1.0\" encoding=\"ISO-8859-1\" ?>\n\
             <?xml-stylesheet type=\"text/xsl\" href=\"meno-stats.xsl\"?>\n\
             <stats>\n  \
             <account><aid>42</aid></account>\n  \
             <character><cid>5</cid><world>a&amp;b</world>\n    \
             <activity date=\"09-02-2023\">{}</activity>\n  \
             </character>\n\
             </stats>\n",
            "0".repeat(1440)
        );
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_account_without_activity() {
        let xml = render_document(9, &[]);
        assert!(xml.contains("<aid>9</aid>"));
        assert!(!xml.contains("<character>"));
    }

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("abc"), b"abc".to_vec());
        assert_eq!(encode_latin1("\u{e9}"), vec![0xE9]);
        assert_eq!(encode_latin1("\u{142}"), b"&#322;".to_vec());
    }
}
