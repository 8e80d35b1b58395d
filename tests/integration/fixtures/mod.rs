// Test fixtures with known part descriptions and expected outputs
// WHY: Golden-file testing requires deterministic input/output pairs for validation

#![allow(dead_code)]

/// Dictionary pairs used throughout the worked examples
pub const SAMPLE_TERMS: &[(&str, &str)] = &[("Stainless Steel", "SS"), ("Recirculation", "RECIRC")];

/// Same pairs in the on-disk dictionary format
pub const SAMPLE_DICTIONARY_JSON: &str = r#"[
  { "original": "Stainless Steel", "abbreviated": "SS" },
  { "original": "Recirculation", "abbreviated": "RECIRC" }
]"#;

/// Small batch whose rows only need the dictionary or no change at all
pub const SIMPLE_PARTS_CSV: &str = "Part Number,Part Definition
P-100,Stainless Steel Recirculation Pump Assembly
P-101,Temperature Controller
";

/// Expected output for SIMPLE_PARTS_CSV at target length 30 with SAMPLE_TERMS
pub const SIMPLE_PARTS_EXPECTED: &str = "Part Number,Part Definition,Abbreviation,Original Length,Final Length,Length Reduction,Applied Rules,Method Used,Confidence,Is Standard,Suggestions
P-100,Stainless Steel Recirculation Pump Assembly,SS RECIRC Pump Assembly,43,23,46.5%,dictionary: 'Stainless Steel' -> 'SS'; dictionary: 'Recirculation' -> 'RECIRC',dictionary,1.00,Yes,
P-101,Temperature Controller,Temperature Controller,22,22,0.0%,,no_change,1.00,Yes,
";

/// Batch mixing dictionary hits, rule-pass rows, an empty row and extra columns
pub const MIXED_PARTS_CSV: &str = "Vendor,Part Number,Part Definition
Acme,H-1,Thermostatic Mixing Valve Assembly with Check Stops
Acme,H-2,
Bolt,H-3,Stainless Steel Recirculation Pump Assembly
Bolt,H-4,Thermoregulatorization
Bolt,H-5,Valve
";

/// Reviewed abbreviations used to train ranking models
pub const TRAINING_CSV: &str = "Part Definition,Abbreviation
Thermostat Housing,Thermstt Hsng
Bracket Housing,Brckt Hsng
Gasket Housing,Gskt Hsng
";

/// Descriptions of varying length for property checks
pub const DESCRIPTIONS: &[&str] = &[
    "Temperature Controller",
    "Stainless Steel Recirculation Pump Assembly",
    "Thermostatic Mixing Valve Assembly with Check Stops",
    "Thermoregulatorization",
    "Factory Assembled Hydrotherapy Shower Cabinet Group",
    "Butterfly Valve 3/4\" Bronze Body w/ Lever Handle",
    "Differential Pressure Transmitter, Remote Mount",
    "Variable Frequency Drive Replacement Keypad Display",
    "Condensate Neutralizer Kit",
    "Pump",
];
