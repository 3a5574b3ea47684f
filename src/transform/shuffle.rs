use crate::utils::error::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Permute every field independently across `records`. Field value
/// distributions survive, row associations do not, which is enough to
/// publish a demo export. The input is left untouched.
pub fn shuffle_records<T>(records: &[T], seed: u64) -> Result<Vec<T>>
where
    T: Serialize + DeserializeOwned,
{
    let mut rows = records
        .iter()
        .map(|record| -> Result<Map<String, Value>> {
            Ok(serde_json::from_value(serde_json::to_value(record)?)?)
        })
        .collect::<Result<Vec<_>>>()?;

    let fields: Vec<String> = rows
        .first()
        .map(|row| row.keys().cloned().collect())
        .unwrap_or_default();

    let mut rng = StdRng::seed_from_u64(seed);
    for field in &fields {
        let mut column: Vec<Value> = rows
            .iter_mut()
            .map(|row| row.remove(field).unwrap_or(Value::Null))
            .collect();
        column.shuffle(&mut rng);
        for (row, value) in rows.iter_mut().zip(column) {
            row.insert(field.clone(), value);
        }
    }

    tracing::debug!("Shuffled {} fields across {} records", fields.len(), rows.len());

    rows.into_iter()
        .map(|row| -> Result<T> { Ok(serde_json::from_value(Value::Object(row))?) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        letter: String,
        parity: Option<i64>,
    }

    fn sample() -> Vec<Row> {
        (0..20)
            .map(|i| Row {
                letter: ["a", "b", "c", "d"][i % 4].to_string(),
                parity: if i % 5 == 0 { None } else { Some((i % 2) as i64) },
            })
            .collect()
    }

    #[test]
    fn test_shuffle_keeps_field_values() {
        let original = sample();
        let shuffled = shuffle_records(&original, 7).unwrap();
        assert_eq!(shuffled.len(), original.len());

        let mut before: Vec<String> = original.iter().map(|r| r.letter.clone()).collect();
        let mut after: Vec<String> = shuffled.iter().map(|r| r.letter.clone()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        let mut before: Vec<Option<i64>> = original.iter().map(|r| r.parity).collect();
        let mut after: Vec<Option<i64>> = shuffled.iter().map(|r| r.parity).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    #[test]
    fn test_shuffle_is_deterministic_per_seed() {
        let rows = sample();
        assert_eq!(
            shuffle_records(&rows, 42).unwrap(),
            shuffle_records(&rows, 42).unwrap()
        );
        assert_ne!(shuffle_records(&rows, 42).unwrap(), rows);
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<Row> = Vec::new();
        assert!(shuffle_records(&rows, 1).unwrap().is_empty());
    }
}
