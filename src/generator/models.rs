#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelOption {
    pub title: &'static str,
    pub id: &'static str,
    pub note: &'static str,
    pub high_cost: bool,
}

/// Models offered in the selection list, in display order.
pub const MODELS: &[ModelOption] = &[
    ModelOption {
        title: "GPT-5 pro",
        id: "gpt-5-pro",
        note: "Warning: High Cost",
        high_cost: true,
    },
    ModelOption {
        title: "GPT-5",
        id: "gpt-5",
        note: "",
        high_cost: false,
    },
    ModelOption {
        title: "GPT-5 mini",
        id: "gpt-5-mini",
        note: "",
        high_cost: false,
    },
    ModelOption {
        title: "GPT-5 nano",
        id: "gpt-5-nano",
        note: "",
        high_cost: false,
    },
    ModelOption {
        title: "GPT-4.1",
        id: "gpt-4.1",
        note: "Legacy",
        high_cost: false,
    },
];

pub fn find(id: &str) -> Option<&'static ModelOption> {
    MODELS.iter().find(|m| m.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_ids_are_unique() {
        for (i, a) in MODELS.iter().enumerate() {
            for b in &MODELS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn only_pro_model_is_flagged_expensive() {
        let flagged: Vec<&str> = MODELS.iter().filter(|m| m.high_cost).map(|m| m.id).collect();
        assert_eq!(flagged, vec!["gpt-5-pro"]);
        assert_eq!(find("gpt-4.1").map(|m| m.note), Some("Legacy"));
        assert!(find("gpt-3").is_none());
    }
}
