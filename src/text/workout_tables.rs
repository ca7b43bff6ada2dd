//! Keyword, brand, and template tables behind workout descriptions.
//!
//! Order matters in every slice: the first match wins.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutKind {
    WeightTraining,
    Tonal,
    Run,
    Ride,
    Walk,
    Hike,
    Swim,
    Yoga,
    Pilates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioBrand {
    SoulCycle,
    Peloton,
}

/// Which figure leads a template; the other one is used when it is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Distance,
    Duration,
}

/// Activity type tags, compared after lower-casing and dropping
/// non-alphanumerics (`"WeightTraining"` and `"weight training"` both match).
pub const TYPE_TAGS: &[(&str, WorkoutKind)] = &[
    ("weighttraining", WorkoutKind::WeightTraining),
    ("strengthtraining", WorkoutKind::WeightTraining),
    ("run", WorkoutKind::Run),
    ("trailrun", WorkoutKind::Run),
    ("virtualrun", WorkoutKind::Run),
    ("ride", WorkoutKind::Ride),
    ("virtualride", WorkoutKind::Ride),
    ("cycling", WorkoutKind::Ride),
    ("walk", WorkoutKind::Walk),
    ("hike", WorkoutKind::Hike),
    ("swim", WorkoutKind::Swim),
    ("yoga", WorkoutKind::Yoga),
    ("pilates", WorkoutKind::Pilates),
];

/// Word-prefix keywords searched in the lower-cased activity name when no
/// type tag is available.
pub const NAME_KEYWORDS: &[(&str, WorkoutKind)] = &[
    ("tonal", WorkoutKind::Tonal),
    ("weight", WorkoutKind::WeightTraining),
    ("lift", WorkoutKind::WeightTraining),
    ("strength", WorkoutKind::WeightTraining),
    ("soulcycle", WorkoutKind::Ride),
    ("soul cycle", WorkoutKind::Ride),
    ("peloton", WorkoutKind::Ride),
    ("spin", WorkoutKind::Ride),
    ("cycl", WorkoutKind::Ride),
    ("bike", WorkoutKind::Ride),
    ("ride", WorkoutKind::Ride),
    ("run", WorkoutKind::Run),
    ("jog", WorkoutKind::Run),
    ("walk", WorkoutKind::Walk),
    ("hike", WorkoutKind::Hike),
    ("swim", WorkoutKind::Swim),
    ("yoga", WorkoutKind::Yoga),
    ("pilates", WorkoutKind::Pilates),
];

pub struct KindTemplate {
    pub kind: WorkoutKind,
    pub measure: Measure,
    pub template: &'static str,
}

/// Templates for every kind except rides, which go through the cycling
/// classifier. Placeholders: `{measure}`, `{location}`.
pub const KIND_TEMPLATES: &[KindTemplate] = &[
    KindTemplate {
        kind: WorkoutKind::WeightTraining,
        measure: Measure::Duration,
        template: "{measure} weight training session{location}",
    },
    KindTemplate {
        kind: WorkoutKind::Tonal,
        measure: Measure::Duration,
        template: "{measure} tonal strength session{location}",
    },
    KindTemplate {
        kind: WorkoutKind::Run,
        measure: Measure::Distance,
        template: "{measure} run{location}",
    },
    KindTemplate {
        kind: WorkoutKind::Walk,
        measure: Measure::Distance,
        template: "{measure} walk{location}",
    },
    KindTemplate {
        kind: WorkoutKind::Hike,
        measure: Measure::Distance,
        template: "{measure} hike{location}",
    },
    KindTemplate {
        kind: WorkoutKind::Swim,
        measure: Measure::Duration,
        template: "{measure} swim{location}",
    },
    KindTemplate {
        kind: WorkoutKind::Yoga,
        measure: Measure::Duration,
        template: "{measure} yoga class{location}",
    },
    KindTemplate {
        kind: WorkoutKind::Pilates,
        measure: Measure::Duration,
        template: "{measure} pilates class{location}",
    },
];

/// Last resort: `{distance} {raw activity text}`.
pub const GENERIC_TEMPLATE: &str = "{distance} {activity}";

pub const OUTDOOR_RIDE_TEMPLATE: &str = "{distance} bike ride{location}";

/// Rides longer than this many miles are treated as indoor.
pub const INDOOR_DISTANCE_THRESHOLD: f64 = 15.0;

/// Distance unit suffixes and how many of each make a mile. A bare number or
/// an unlisted unit reads as miles.
pub const UNITS_PER_MILE: &[(&str, f64)] = &[
    ("mi", 1.0),
    ("mile", 1.0),
    ("miles", 1.0),
    ("km", 1.609_344),
    ("kms", 1.609_344),
    ("kilometer", 1.609_344),
    ("kilometers", 1.609_344),
    ("kilometre", 1.609_344),
    ("kilometres", 1.609_344),
    ("m", 1_609.344),
    ("meter", 1_609.344),
    ("meters", 1_609.344),
    ("metre", 1_609.344),
    ("metres", 1_609.344),
];

pub const SPIN_KEYWORD: &str = "spin";

pub const STUDIO_BRANDS: &[(&str, StudioBrand)] = &[
    ("soulcycle", StudioBrand::SoulCycle),
    ("soul cycle", StudioBrand::SoulCycle),
    ("peloton", StudioBrand::Peloton),
];

/// Keywords that, together with an instructor mention, mark a class.
pub const CLASS_TYPE_KEYWORDS: &[&str] = &[
    "hip-hop",
    "hip hop",
    "pop",
    "climb",
    "intervals",
    "spin",
    "class",
];

/// Brand class-type lookup: (brand, keyword, label).
pub const BRAND_CLASS_TYPES: &[(StudioBrand, &str, &str)] = &[
    (StudioBrand::Peloton, "power zone", "power zone"),
    (StudioBrand::Peloton, "low impact", "low impact"),
    (StudioBrand::Peloton, "hip hop", "hip hop"),
    (StudioBrand::Peloton, "hip-hop", "hip hop"),
    (StudioBrand::Peloton, "climb", "climb"),
    (StudioBrand::Peloton, "intervals", "intervals"),
    (StudioBrand::Peloton, "tabata", "tabata"),
    (StudioBrand::Peloton, "hiit", "hiit"),
    (StudioBrand::Peloton, "endurance", "endurance"),
    (StudioBrand::Peloton, "recovery", "recovery"),
    (StudioBrand::Peloton, "rock", "rock"),
    (StudioBrand::Peloton, "edm", "edm"),
    (StudioBrand::Peloton, "country", "country"),
    (StudioBrand::Peloton, "latin", "latin"),
    (StudioBrand::Peloton, "pop", "pop"),
    (StudioBrand::SoulCycle, "soul survivor", "soul survivor"),
    (StudioBrand::SoulCycle, "anthems", "anthems"),
    (StudioBrand::SoulCycle, "throwback", "throwback"),
    (StudioBrand::SoulCycle, "hip hop", "hip hop"),
    (StudioBrand::SoulCycle, "hip-hop", "hip hop"),
    (StudioBrand::SoulCycle, "intro", "intro"),
    (StudioBrand::SoulCycle, "pop", "pop"),
];

/// Separator after which a brand puts the instructor's name in class titles.
pub const BRAND_TRAILING_NAME_SEPARATORS: &[(StudioBrand, &str)] = &[
    (StudioBrand::SoulCycle, " - "),
    (StudioBrand::Peloton, ":"),
];

/// Words that look like a possessive instructor but are not.
pub const NOT_INSTRUCTORS: &[&str] = &[
    "today", "tonight", "morning", "evening", "night", "week", "weekend", "sunday", "saturday",
];

/// Phrasings for indoor classes. Placeholders: `{duration}`, `{class}`,
/// `{instructor}`, `{location}`.
pub struct IndoorPhrasing {
    pub brand: Option<StudioBrand>,
    pub with_both: &'static str,
    pub instructor_only: &'static str,
    pub class_only: &'static str,
}

pub const INDOOR_PHRASINGS: &[IndoorPhrasing] = &[
    IndoorPhrasing {
        brand: Some(StudioBrand::SoulCycle),
        with_both: "{duration} soulcycle {class} class with {instructor}{location}",
        instructor_only: "{duration} soulcycle class with {instructor}{location}",
        class_only: "{duration} soulcycle {class} class{location}",
    },
    IndoorPhrasing {
        brand: Some(StudioBrand::Peloton),
        with_both: "{duration} peloton {class} ride with {instructor}{location}",
        instructor_only: "{duration} peloton ride with {instructor}{location}",
        class_only: "{duration} peloton {class} ride{location}",
    },
    IndoorPhrasing {
        brand: None,
        with_both: "{duration} {class} spin class with {instructor}{location}",
        instructor_only: "{duration} spin class with {instructor}{location}",
        class_only: "{duration} {class} spin class{location}",
    },
];

pub const GENERIC_INDOOR_TEMPLATE: &str = "{duration} indoor cycling class{location}";

/// Output energy suffix, only for brands that report it.
pub const OUTPUT_SUFFIX_BRANDS: &[StudioBrand] = &[StudioBrand::Peloton];

/// Place names recognized without an explicit `in <place>`.
pub const KNOWN_PLACES: &[&str] = &[
    "mammoth", "tahoe", "sf", "nyc", "marin", "presidio", "yosemite", "berkeley", "oakland",
    "brooklyn", "manhattan", "boulder", "austin", "seattle", "portland", "chicago", "london",
    "paris", "tokyo",
];

/// Words after `in` that are never places.
pub const NOT_PLACES: &[&str] = &["the", "a", "an", "my", "our", "between"];
