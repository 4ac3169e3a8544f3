use std::collections::HashMap;

pub mod metrics;
pub mod validation;

/// Distinct values in the order they are first seen.
pub fn distinct_in_order<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut distinct = Vec::new();
    for value in values {
        let value = value.as_ref();
        if seen.insert(value.to_string()) {
            distinct.push(value.to_string());
        }
    }
    distinct
}

/// Occurrence counts in first-seen order.
pub fn frequency_counts<I, S>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for value in values {
        let value = value.as_ref();
        match position.get(value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                position.insert(value.to_string(), counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    counts
}

/// The `k` most frequent values, most frequent first. Equal counts keep
/// first-seen order.
pub fn top_k_by_frequency<I, S>(values: I, k: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = frequency_counts(values);
    // stable sort keeps first-seen order within a count
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(k).map(|(value, _)| value).collect()
}

pub fn most_frequent<I, S>(values: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    top_k_by_frequency(values, 1).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_in_order() {
        let values = ["b", "a", "b", "c", "a"];
        assert_eq!(distinct_in_order(values), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_top_k_by_frequency() {
        let values = ["x", "y", "y", "z", "z", "w"];
        assert_eq!(top_k_by_frequency(values, 2), vec!["y", "z"]);
        assert_eq!(top_k_by_frequency(values, 10), vec!["y", "z", "x", "w"]);
        assert!(top_k_by_frequency(Vec::<String>::new(), 3).is_empty());
    }

    #[test]
    fn test_most_frequent_tie_goes_to_first_seen() {
        assert_eq!(most_frequent(["Party", "Formal", "Formal", "Party"]), Some("Party".to_string()));
        assert_eq!(most_frequent(Vec::<&str>::new()), None);
    }
}
