use std::collections::HashMap;

use serde::Serialize;

use crate::types::{TranslationRecord, title_code};

/// Records sharing a title code, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedTranslation {
	pub code: String,
	pub records: Vec<TranslationRecord>,
}

/// Bucket records by code in a single stable pass.
///
/// Groups appear in the order their code is first seen; records keep their
/// relative order inside a group.
#[must_use]
pub fn group(records: impl IntoIterator<Item = TranslationRecord>) -> Vec<GroupedTranslation> {
	let mut groups: Vec<GroupedTranslation> = Vec::new();
	let mut positions: HashMap<String, usize> = HashMap::new();

	for record in records {
		let code = title_code(&record.title);
		match positions.get(code) {
			Some(&position) => groups[position].records.push(record),
			None => {
				let code = code.to_string();
				positions.insert(code.clone(), groups.len());
				groups.push(GroupedTranslation {
					code,
					records: vec![record],
				});
			}
		}
	}

	groups
}

/// Concatenate groups back into a flat record list.
#[must_use]
pub fn flatten(groups: &[GroupedTranslation]) -> Vec<TranslationRecord> {
	groups
		.iter()
		.flat_map(|group| group.records.iter().cloned())
		.collect()
}
