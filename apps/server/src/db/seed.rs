//! Reference rows loaded by `migrations/0002_reference_data.sql`.
//!
//! Kept here as well so the in-memory backend starts from the same data.

/// (abbreviation, name, system url)
pub const INDEX_CODE_SYSTEMS: &[(&str, &str, &str)] = &[
    ("RADLEX", "RadLex", "http://radlex.org"),
    ("SNOMEDCT", "SNOMED CT", "http://snomed.info/sct"),
    ("LOINC", "LOINC", "http://loinc.org"),
    ("ICD10", "ICD-10", "http://hl7.org/fhir/sid/icd-10"),
    ("RADELEMENT", "RadElement", "https://www.radelement.org"),
];

/// (code, short name, name)
pub const SPECIALTIES: &[(&str, &str, &str)] = &[
    ("AB", "Abdominal", "Abdominal Radiology"),
    ("BR", "Breast", "Breast Imaging"),
    ("CA", "Cardiac", "Cardiac Radiology"),
    ("CH", "Chest", "Chest Radiology"),
    ("ER", "Emergency", "Emergency Radiology"),
    ("GI", "GI", "Gastrointestinal Radiology"),
    ("GU", "GU", "Genitourinary Radiology"),
    ("HN", "Head and Neck", "Head and Neck Radiology"),
    ("IR", "Interventional", "Interventional Radiology"),
    ("MK", "Musculoskeletal", "Musculoskeletal Radiology"),
    ("NM", "Nuclear", "Nuclear Medicine"),
    ("NR", "Neuro", "Neuroradiology"),
    ("OB", "OB/GYN", "Obstetric and Gynecologic Radiology"),
    ("PD", "Pediatric", "Pediatric Radiology"),
    ("VA", "Vascular", "Vascular Imaging"),
];
