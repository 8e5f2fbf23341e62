//! Feature catalogue for the FNA classifier
//!
//! The model consumes 30 measurements of cell nuclei taken from a fine needle
//! aspirate image: ten base measurements, each reported as the mean, the
//! standard error and the "worst" (mean of the three largest) value.

/// Number of features the model expects
pub const FEATURE_COUNT: usize = 30;

/// Feature names in the order the backend expects them
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "mean radius",
    "mean texture",
    "mean perimeter",
    "mean area",
    "mean smoothness",
    "mean compactness",
    "mean concavity",
    "mean concave points",
    "mean symmetry",
    "mean fractal dimension",
    "radius error",
    "texture error",
    "perimeter error",
    "area error",
    "smoothness error",
    "compactness error",
    "concavity error",
    "concave points error",
    "symmetry error",
    "fractal dimension error",
    "worst radius",
    "worst texture",
    "worst perimeter",
    "worst area",
    "worst smoothness",
    "worst compactness",
    "worst concavity",
    "worst concave points",
    "worst symmetry",
    "worst fractal dimension",
];

/// Reference sample used by "load example"
pub const EXAMPLE_FEATURES: [f64; FEATURE_COUNT] = [
    17.99, 10.38, 122.8, 1001.0, 0.1184, 0.2776, 0.3001, 0.1471, 0.2419, 0.07871, 1.095, 0.9053,
    8.589, 153.4, 0.006399, 0.04904, 0.05373, 0.01587, 0.03003, 0.006193, 25.38, 17.33, 184.6,
    2019.0, 0.1622, 0.6656, 0.7119, 0.2654, 0.4601, 0.1189,
];

/// Name of the feature at `index`, if it exists
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_NAMES.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_unique() {
        let mut names = FEATURE_NAMES.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_example_is_finite() {
        assert!(EXAMPLE_FEATURES.iter().all(|v| v.is_finite()));
        assert_eq!(EXAMPLE_FEATURES[0], 17.99);
        assert_eq!(EXAMPLE_FEATURES[FEATURE_COUNT - 1], 0.1189);
    }

    #[test]
    fn test_feature_name_lookup() {
        assert_eq!(feature_name(0), Some("mean radius"));
        assert_eq!(feature_name(29), Some("worst fractal dimension"));
        assert_eq!(feature_name(30), None);
    }
}
