//! CSV export of normalized records.

use crate::common::csv::write_row;

use super::NormalizedRecord;

const BASIC_HEADER: [&str; 4] = ["postTitle", "text", "likesCount", "sourceUrl"];
const PROFILE_HEADER: [&str; 4] = ["profileName", "profileId", "profileUrl", "profilePicture"];

/// Which columns the export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvLayout {
    #[default]
    Basic,
    /// Basic columns followed by the commenter profile columns.
    Extended,
}

pub fn records_to_csv(records: &[NormalizedRecord], layout: CsvLayout) -> String {
    let mut out = String::new();

    match layout {
        CsvLayout::Basic => write_row(&mut out, &BASIC_HEADER),
        CsvLayout::Extended => {
            let header: Vec<&str> = BASIC_HEADER.iter().chain(&PROFILE_HEADER).copied().collect();
            write_row(&mut out, &header);
        }
    }

    for record in records {
        let mut row = vec![
            record.post_title.as_str(),
            record.text.as_str(),
            record.likes_count.as_str(),
            record.source_url.as_str(),
        ];
        if layout == CsvLayout::Extended {
            row.extend([
                record.profile_name.as_str(),
                record.profile_id.as_str(),
                record.profile_url.as_str(),
                record.profile_picture.as_str(),
            ]);
        }
        write_row(&mut out, &row);
    }

    out
}
