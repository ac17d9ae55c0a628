use serde::Serialize;

use crate::dataset::Sex;

const BOTH: &[Sex] = &[Sex::Male, Sex::Female];
const MALE_ONLY: &[Sex] = &[Sex::Male];

/// Weight classes from lightest to heaviest and the sexes each one is listed for.
const WEIGHT_CLASSES: &[(&str, &[Sex])] = &[
    ("minimumweight", BOTH),
    ("flyweight", BOTH),
    ("bantamweight", BOTH),
    ("featherweight", BOTH),
    ("lightweight", BOTH),
    ("welterweight", BOTH),
    ("middleweight", BOTH),
    ("cruiserweight", MALE_ONLY),
    ("heavyweight", BOTH),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    fn new(label: &str, value: &str) -> DropdownOption {
        DropdownOption {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

pub fn weight_classes(sex: Sex) -> impl Iterator<Item = &'static str> {
    WEIGHT_CLASSES
        .iter()
        .filter(move |(_, sexes)| sexes.contains(&sex))
        .map(|(name, _)| *name)
}

/// Options for the weight-class selector given the raw sex selector value.
pub fn weight_options(sex: &str) -> Vec<DropdownOption> {
    weight_classes(Sex::from_selector(sex))
        .map(|weight| DropdownOption::new(weight, weight))
        .collect()
}

pub fn sex_options() -> Vec<DropdownOption> {
    [Sex::Male, Sex::Female]
        .iter()
        .map(|sex| DropdownOption::new(sex.label(), sex.code()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(options: &[DropdownOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    #[test]
    fn male_options_list_nine_classes_in_order() {
        let options = weight_options("M");
        assert_eq!(
            values(&options),
            vec![
                "minimumweight",
                "flyweight",
                "bantamweight",
                "featherweight",
                "lightweight",
                "welterweight",
                "middleweight",
                "cruiserweight",
                "heavyweight",
            ]
        );
        assert!(options.iter().all(|o| o.label == o.value));
    }

    #[test]
    fn female_options_skip_cruiserweight() {
        let expected = vec![
            "minimumweight",
            "flyweight",
            "bantamweight",
            "featherweight",
            "lightweight",
            "welterweight",
            "middleweight",
            "heavyweight",
        ];
        assert_eq!(values(&weight_options("F")), expected);
        for other in ["", "m", "X", "Male"] {
            assert_eq!(values(&weight_options(other)), expected);
        }
    }

    #[test]
    fn sex_options_are_male_then_female() {
        assert_eq!(
            sex_options(),
            vec![
                DropdownOption::new("Male", "M"),
                DropdownOption::new("Female", "F"),
            ]
        );
    }
}
