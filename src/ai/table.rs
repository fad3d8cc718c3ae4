// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The GS1 Application Identifier table.
//!
//! The table is a process-lifetime static of plain structs so that lookup
//! and validation walk contiguous data with no per-entry initialisation.
//! Every entry declares up to five typed components; a `Cset::None`
//! component terminates the list.

use super::linters::Linter;

/// Character set of an AI component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cset {
    /// End-of-components sentinel.
    None,
    /// Digits only.
    Numeric,
    /// The 82-character AI alphabet.
    Cset82,
    /// CPID characters. Validated as CSET 82.
    CsetC,
}

/// One typed component of an AI value.
#[derive(Debug, Clone, Copy)]
pub struct AiComponent {
    pub cset: Cset,
    pub min: u8,
    pub max: u8,
    pub linters: &'static [Linter],
}

/// One AI table entry.
#[derive(Debug)]
pub struct AiEntry {
    /// The 2 to 4 digit AI key.
    pub ai: &'static str,
    /// Whether the value must be terminated by FNC1 when another AI follows.
    pub fnc1: bool,
    pub parts: [AiComponent; 5],
    /// Short human-readable data title.
    pub title: &'static str,
}

const FNC1: bool = true;
const NO_FNC1: bool = false;

const NO_LINTERS: &[Linter] = &[];
const CSUM: &[Linter] = &[Linter::Csum];

const NONE: AiComponent = AiComponent { cset: Cset::None, min: 0, max: 0, linters: NO_LINTERS };

const fn n(min: u8, max: u8) -> AiComponent {
    AiComponent { cset: Cset::Numeric, min, max, linters: NO_LINTERS }
}

const fn n_csum(min: u8, max: u8) -> AiComponent {
    AiComponent { cset: Cset::Numeric, min, max, linters: CSUM }
}

const fn x(min: u8, max: u8) -> AiComponent {
    AiComponent { cset: Cset::Cset82, min, max, linters: NO_LINTERS }
}

const fn c(min: u8, max: u8) -> AiComponent {
    AiComponent { cset: Cset::CsetC, min, max, linters: NO_LINTERS }
}

const fn one(c1: AiComponent) -> [AiComponent; 5] {
    [c1, NONE, NONE, NONE, NONE]
}

const fn two(c1: AiComponent, c2: AiComponent) -> [AiComponent; 5] {
    [c1, c2, NONE, NONE, NONE]
}

const fn three(c1: AiComponent, c2: AiComponent, c3: AiComponent) -> [AiComponent; 5] {
    [c1, c2, c3, NONE, NONE]
}

const fn four(c1: AiComponent, c2: AiComponent, c3: AiComponent, c4: AiComponent) -> [AiComponent; 5] {
    [c1, c2, c3, c4, NONE]
}

const fn five(
    c1: AiComponent,
    c2: AiComponent,
    c3: AiComponent,
    c4: AiComponent,
    c5: AiComponent,
) -> [AiComponent; 5] {
    [c1, c2, c3, c4, c5]
}

const fn ai(key: &'static str, fnc1: bool, parts: [AiComponent; 5], title: &'static str) -> AiEntry {
    AiEntry { ai: key, fnc1, parts, title }
}

/// AI prefixes whose values have a pre-defined length and therefore take no
/// terminating FNC1.
pub const FIXED_AI_PREFIXES: &[&str] = &[
    "00", "01", "02",
    "03", "04",
    "11", "12", "13", "14", "15", "16", "17", "18", "19",
    "20",
    "31", "32", "33", "34", "35", "36",
    "41",
];

/// Whether an FNC1 separator is required after a value of the given AI.
pub fn fnc1_required(key: &str) -> bool {
    !FIXED_AI_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

pub static AI_TABLE: &[AiEntry] = &[
    ai("00", NO_FNC1, one(n_csum(18, 18)), "SSCC"),
    ai("01", NO_FNC1, one(n_csum(14, 14)), "GTIN"),
    ai("02", NO_FNC1, one(n_csum(14, 14)), "CONTENT"),
    ai("10", FNC1, one(x(1, 20)), "BATCH/LOT"),
    ai("11", NO_FNC1, one(n(6, 6)), "PROD DATE"),
    ai("12", NO_FNC1, one(n(6, 6)), "DUE DATE"),
    ai("13", NO_FNC1, one(n(6, 6)), "PACK DATE"),
    ai("15", NO_FNC1, one(n(6, 6)), "BEST BEFORE or BEST BY"),
    ai("16", NO_FNC1, one(n(6, 6)), "SELL BY"),
    ai("17", NO_FNC1, one(n(6, 6)), "USE BY or EXPIRY"),
    ai("20", NO_FNC1, one(n(2, 2)), "VARIANT"),
    ai("21", FNC1, one(x(1, 20)), "SERIAL"),
    ai("22", FNC1, one(x(1, 20)), "CPV"),
    ai("235", FNC1, one(x(1, 28)), "TPX"),
    ai("240", FNC1, one(x(1, 30)), "ADDITIONAL ID"),
    ai("241", FNC1, one(x(1, 30)), "CUST. PART NO."),
    ai("242", FNC1, one(n(1, 6)), "MTO VARIANT"),
    ai("243", FNC1, one(x(1, 20)), "PCN"),
    ai("250", FNC1, one(x(1, 30)), "SECONDARY SERIAL"),
    ai("251", FNC1, one(x(1, 30)), "REF. TO SOURCE"),
    ai("253", FNC1, two(n_csum(13, 13), x(0, 17)), "GDTI"),
    ai("254", FNC1, one(x(1, 20)), "GLN EXTENSION COMPONENT"),
    ai("255", FNC1, two(n_csum(13, 13), n(0, 12)), "GCN"),
    ai("30", FNC1, one(n(1, 8)), "VAR. COUNT"),
    ai("3100", NO_FNC1, one(n(6, 6)), "NET WEIGHT (kg)"),
    ai("3101", NO_FNC1, one(n(6, 6)), "NET WEIGHT (kg)"),
    ai("3102", NO_FNC1, one(n(6, 6)), "NET WEIGHT (kg)"),
    ai("3103", NO_FNC1, one(n(6, 6)), "NET WEIGHT (kg)"),
    ai("3104", NO_FNC1, one(n(6, 6)), "NET WEIGHT (kg)"),
    ai("3105", NO_FNC1, one(n(6, 6)), "NET WEIGHT (kg)"),
    ai("3110", NO_FNC1, one(n(6, 6)), "LENGTH (m)"),
    ai("3111", NO_FNC1, one(n(6, 6)), "LENGTH (m)"),
    ai("3112", NO_FNC1, one(n(6, 6)), "LENGTH (m)"),
    ai("3113", NO_FNC1, one(n(6, 6)), "LENGTH (m)"),
    ai("3114", NO_FNC1, one(n(6, 6)), "LENGTH (m)"),
    ai("3115", NO_FNC1, one(n(6, 6)), "LENGTH (m)"),
    ai("3120", NO_FNC1, one(n(6, 6)), "WIDTH (m)"),
    ai("3121", NO_FNC1, one(n(6, 6)), "WIDTH (m)"),
    ai("3122", NO_FNC1, one(n(6, 6)), "WIDTH (m)"),
    ai("3123", NO_FNC1, one(n(6, 6)), "WIDTH (m)"),
    ai("3124", NO_FNC1, one(n(6, 6)), "WIDTH (m)"),
    ai("3125", NO_FNC1, one(n(6, 6)), "WIDTH (m)"),
    ai("3130", NO_FNC1, one(n(6, 6)), "HEIGHT (m)"),
    ai("3131", NO_FNC1, one(n(6, 6)), "HEIGHT (m)"),
    ai("3132", NO_FNC1, one(n(6, 6)), "HEIGHT (m)"),
    ai("3133", NO_FNC1, one(n(6, 6)), "HEIGHT (m)"),
    ai("3134", NO_FNC1, one(n(6, 6)), "HEIGHT (m)"),
    ai("3135", NO_FNC1, one(n(6, 6)), "HEIGHT (m)"),
    ai("3140", NO_FNC1, one(n(6, 6)), "AREA (m^2)"),
    ai("3141", NO_FNC1, one(n(6, 6)), "AREA (m^2)"),
    ai("3142", NO_FNC1, one(n(6, 6)), "AREA (m^2)"),
    ai("3143", NO_FNC1, one(n(6, 6)), "AREA (m^2)"),
    ai("3144", NO_FNC1, one(n(6, 6)), "AREA (m^2)"),
    ai("3145", NO_FNC1, one(n(6, 6)), "AREA (m^2)"),
    ai("3150", NO_FNC1, one(n(6, 6)), "NET VOLUME (l)"),
    ai("3151", NO_FNC1, one(n(6, 6)), "NET VOLUME (l)"),
    ai("3152", NO_FNC1, one(n(6, 6)), "NET VOLUME (l)"),
    ai("3153", NO_FNC1, one(n(6, 6)), "NET VOLUME (l)"),
    ai("3154", NO_FNC1, one(n(6, 6)), "NET VOLUME (l)"),
    ai("3155", NO_FNC1, one(n(6, 6)), "NET VOLUME (l)"),
    ai("3160", NO_FNC1, one(n(6, 6)), "NET VOLUME (m^3)"),
    ai("3161", NO_FNC1, one(n(6, 6)), "NET VOLUME (m^3)"),
    ai("3162", NO_FNC1, one(n(6, 6)), "NET VOLUME (m^3)"),
    ai("3163", NO_FNC1, one(n(6, 6)), "NET VOLUME (m^3)"),
    ai("3164", NO_FNC1, one(n(6, 6)), "NET VOLUME (m^3)"),
    ai("3165", NO_FNC1, one(n(6, 6)), "NET VOLUME (m^3)"),
    ai("3200", NO_FNC1, one(n(6, 6)), "NET WEIGHT (lb)"),
    ai("3201", NO_FNC1, one(n(6, 6)), "NET WEIGHT (lb)"),
    ai("3202", NO_FNC1, one(n(6, 6)), "NET WEIGHT (lb)"),
    ai("3203", NO_FNC1, one(n(6, 6)), "NET WEIGHT (lb)"),
    ai("3204", NO_FNC1, one(n(6, 6)), "NET WEIGHT (lb)"),
    ai("3205", NO_FNC1, one(n(6, 6)), "NET WEIGHT (lb)"),
    ai("3210", NO_FNC1, one(n(6, 6)), "LENGTH (i)"),
    ai("3211", NO_FNC1, one(n(6, 6)), "LENGTH (i)"),
    ai("3212", NO_FNC1, one(n(6, 6)), "LENGTH (i)"),
    ai("3213", NO_FNC1, one(n(6, 6)), "LENGTH (i)"),
    ai("3214", NO_FNC1, one(n(6, 6)), "LENGTH (i)"),
    ai("3215", NO_FNC1, one(n(6, 6)), "LENGTH (i)"),
    ai("3220", NO_FNC1, one(n(6, 6)), "LENGTH (f)"),
    ai("3221", NO_FNC1, one(n(6, 6)), "LENGTH (f)"),
    ai("3222", NO_FNC1, one(n(6, 6)), "LENGTH (f)"),
    ai("3223", NO_FNC1, one(n(6, 6)), "LENGTH (f)"),
    ai("3224", NO_FNC1, one(n(6, 6)), "LENGTH (f)"),
    ai("3225", NO_FNC1, one(n(6, 6)), "LENGTH (f)"),
    ai("3230", NO_FNC1, one(n(6, 6)), "LENGTH (y)"),
    ai("3231", NO_FNC1, one(n(6, 6)), "LENGTH (y)"),
    ai("3232", NO_FNC1, one(n(6, 6)), "LENGTH (y)"),
    ai("3233", NO_FNC1, one(n(6, 6)), "LENGTH (y)"),
    ai("3234", NO_FNC1, one(n(6, 6)), "LENGTH (y)"),
    ai("3235", NO_FNC1, one(n(6, 6)), "LENGTH (y)"),
    ai("3240", NO_FNC1, one(n(6, 6)), "WIDTH (i)"),
    ai("3241", NO_FNC1, one(n(6, 6)), "WIDTH (i)"),
    ai("3242", NO_FNC1, one(n(6, 6)), "WIDTH (i)"),
    ai("3243", NO_FNC1, one(n(6, 6)), "WIDTH (i)"),
    ai("3244", NO_FNC1, one(n(6, 6)), "WIDTH (i)"),
    ai("3245", NO_FNC1, one(n(6, 6)), "WIDTH (i)"),
    ai("3250", NO_FNC1, one(n(6, 6)), "WIDTH (f)"),
    ai("3251", NO_FNC1, one(n(6, 6)), "WIDTH (f)"),
    ai("3252", NO_FNC1, one(n(6, 6)), "WIDTH (f)"),
    ai("3253", NO_FNC1, one(n(6, 6)), "WIDTH (f)"),
    ai("3254", NO_FNC1, one(n(6, 6)), "WIDTH (f)"),
    ai("3255", NO_FNC1, one(n(6, 6)), "WIDTH (f)"),
    ai("3260", NO_FNC1, one(n(6, 6)), "WIDTH (y)"),
    ai("3261", NO_FNC1, one(n(6, 6)), "WIDTH (y)"),
    ai("3262", NO_FNC1, one(n(6, 6)), "WIDTH (y)"),
    ai("3263", NO_FNC1, one(n(6, 6)), "WIDTH (y)"),
    ai("3264", NO_FNC1, one(n(6, 6)), "WIDTH (y)"),
    ai("3265", NO_FNC1, one(n(6, 6)), "WIDTH (y)"),
    ai("3270", NO_FNC1, one(n(6, 6)), "HEIGHT (i)"),
    ai("3271", NO_FNC1, one(n(6, 6)), "HEIGHT (i)"),
    ai("3272", NO_FNC1, one(n(6, 6)), "HEIGHT (i)"),
    ai("3273", NO_FNC1, one(n(6, 6)), "HEIGHT (i)"),
    ai("3274", NO_FNC1, one(n(6, 6)), "HEIGHT (i)"),
    ai("3275", NO_FNC1, one(n(6, 6)), "HEIGHT (i)"),
    ai("3280", NO_FNC1, one(n(6, 6)), "HEIGHT (f)"),
    ai("3281", NO_FNC1, one(n(6, 6)), "HEIGHT (f)"),
    ai("3282", NO_FNC1, one(n(6, 6)), "HEIGHT (f)"),
    ai("3283", NO_FNC1, one(n(6, 6)), "HEIGHT (f)"),
    ai("3284", NO_FNC1, one(n(6, 6)), "HEIGHT (f)"),
    ai("3285", NO_FNC1, one(n(6, 6)), "HEIGHT (f)"),
    ai("3290", NO_FNC1, one(n(6, 6)), "HEIGHT (y)"),
    ai("3291", NO_FNC1, one(n(6, 6)), "HEIGHT (y)"),
    ai("3292", NO_FNC1, one(n(6, 6)), "HEIGHT (y)"),
    ai("3293", NO_FNC1, one(n(6, 6)), "HEIGHT (y)"),
    ai("3294", NO_FNC1, one(n(6, 6)), "HEIGHT (y)"),
    ai("3295", NO_FNC1, one(n(6, 6)), "HEIGHT (y)"),
    ai("3300", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (kg)"),
    ai("3301", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (kg)"),
    ai("3302", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (kg)"),
    ai("3303", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (kg)"),
    ai("3304", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (kg)"),
    ai("3305", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (kg)"),
    ai("3310", NO_FNC1, one(n(6, 6)), "LENGTH (m), log"),
    ai("3311", NO_FNC1, one(n(6, 6)), "LENGTH (m), log"),
    ai("3312", NO_FNC1, one(n(6, 6)), "LENGTH (m), log"),
    ai("3313", NO_FNC1, one(n(6, 6)), "LENGTH (m), log"),
    ai("3314", NO_FNC1, one(n(6, 6)), "LENGTH (m), log"),
    ai("3315", NO_FNC1, one(n(6, 6)), "LENGTH (m), log"),
    ai("3320", NO_FNC1, one(n(6, 6)), "WIDTH (m), log"),
    ai("3321", NO_FNC1, one(n(6, 6)), "WIDTH (m), log"),
    ai("3322", NO_FNC1, one(n(6, 6)), "WIDTH (m), log"),
    ai("3323", NO_FNC1, one(n(6, 6)), "WIDTH (m), log"),
    ai("3324", NO_FNC1, one(n(6, 6)), "WIDTH (m), log"),
    ai("3325", NO_FNC1, one(n(6, 6)), "WIDTH (m), log"),
    ai("3330", NO_FNC1, one(n(6, 6)), "HEIGHT (m), log"),
    ai("3331", NO_FNC1, one(n(6, 6)), "HEIGHT (m), log"),
    ai("3332", NO_FNC1, one(n(6, 6)), "HEIGHT (m), log"),
    ai("3333", NO_FNC1, one(n(6, 6)), "HEIGHT (m), log"),
    ai("3334", NO_FNC1, one(n(6, 6)), "HEIGHT (m), log"),
    ai("3335", NO_FNC1, one(n(6, 6)), "HEIGHT (m), log"),
    ai("3340", NO_FNC1, one(n(6, 6)), "AREA (m^2), log"),
    ai("3341", NO_FNC1, one(n(6, 6)), "AREA (m^2), log"),
    ai("3342", NO_FNC1, one(n(6, 6)), "AREA (m^2), log"),
    ai("3343", NO_FNC1, one(n(6, 6)), "AREA (m^2), log"),
    ai("3344", NO_FNC1, one(n(6, 6)), "AREA (m^2), log"),
    ai("3345", NO_FNC1, one(n(6, 6)), "AREA (m^2), log"),
    ai("3350", NO_FNC1, one(n(6, 6)), "VOLUME (l), log"),
    ai("3351", NO_FNC1, one(n(6, 6)), "VOLUME (l), log"),
    ai("3352", NO_FNC1, one(n(6, 6)), "VOLUME (l), log"),
    ai("3353", NO_FNC1, one(n(6, 6)), "VOLUME (l), log"),
    ai("3354", NO_FNC1, one(n(6, 6)), "VOLUME (l), log"),
    ai("3355", NO_FNC1, one(n(6, 6)), "VOLUME (l), log"),
    ai("3360", NO_FNC1, one(n(6, 6)), "VOLUME (m^3), log"),
    ai("3361", NO_FNC1, one(n(6, 6)), "VOLUME (m^3), log"),
    ai("3362", NO_FNC1, one(n(6, 6)), "VOLUME (m^3), log"),
    ai("3363", NO_FNC1, one(n(6, 6)), "VOLUME (m^3), log"),
    ai("3364", NO_FNC1, one(n(6, 6)), "VOLUME (m^3), log"),
    ai("3365", NO_FNC1, one(n(6, 6)), "VOLUME (m^3), log"),
    ai("3370", NO_FNC1, one(n(6, 6)), "KG PER m^2"),
    ai("3371", NO_FNC1, one(n(6, 6)), "KG PER m^2"),
    ai("3372", NO_FNC1, one(n(6, 6)), "KG PER m^2"),
    ai("3373", NO_FNC1, one(n(6, 6)), "KG PER m^2"),
    ai("3374", NO_FNC1, one(n(6, 6)), "KG PER m^2"),
    ai("3375", NO_FNC1, one(n(6, 6)), "KG PER m^2"),
    ai("3400", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (lb)"),
    ai("3401", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (lb)"),
    ai("3402", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (lb)"),
    ai("3403", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (lb)"),
    ai("3404", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (lb)"),
    ai("3405", NO_FNC1, one(n(6, 6)), "GROSS WEIGHT (lb)"),
    ai("3410", NO_FNC1, one(n(6, 6)), "LENGTH (i), log"),
    ai("3411", NO_FNC1, one(n(6, 6)), "LENGTH (i), log"),
    ai("3412", NO_FNC1, one(n(6, 6)), "LENGTH (i), log"),
    ai("3413", NO_FNC1, one(n(6, 6)), "LENGTH (i), log"),
    ai("3414", NO_FNC1, one(n(6, 6)), "LENGTH (i), log"),
    ai("3415", NO_FNC1, one(n(6, 6)), "LENGTH (i), log"),
    ai("3420", NO_FNC1, one(n(6, 6)), "LENGTH (f), log"),
    ai("3421", NO_FNC1, one(n(6, 6)), "LENGTH (f), log"),
    ai("3422", NO_FNC1, one(n(6, 6)), "LENGTH (f), log"),
    ai("3423", NO_FNC1, one(n(6, 6)), "LENGTH (f), log"),
    ai("3424", NO_FNC1, one(n(6, 6)), "LENGTH (f), log"),
    ai("3425", NO_FNC1, one(n(6, 6)), "LENGTH (f), log"),
    ai("3430", NO_FNC1, one(n(6, 6)), "LENGTH (y), log"),
    ai("3431", NO_FNC1, one(n(6, 6)), "LENGTH (y), log"),
    ai("3432", NO_FNC1, one(n(6, 6)), "LENGTH (y), log"),
    ai("3433", NO_FNC1, one(n(6, 6)), "LENGTH (y), log"),
    ai("3434", NO_FNC1, one(n(6, 6)), "LENGTH (y), log"),
    ai("3435", NO_FNC1, one(n(6, 6)), "LENGTH (y), log"),
    ai("3440", NO_FNC1, one(n(6, 6)), "WIDTH (i), log"),
    ai("3441", NO_FNC1, one(n(6, 6)), "WIDTH (i), log"),
    ai("3442", NO_FNC1, one(n(6, 6)), "WIDTH (i), log"),
    ai("3443", NO_FNC1, one(n(6, 6)), "WIDTH (i), log"),
    ai("3444", NO_FNC1, one(n(6, 6)), "WIDTH (i), log"),
    ai("3445", NO_FNC1, one(n(6, 6)), "WIDTH (i), log"),
    ai("3450", NO_FNC1, one(n(6, 6)), "WIDTH (f), log"),
    ai("3451", NO_FNC1, one(n(6, 6)), "WIDTH (f), log"),
    ai("3452", NO_FNC1, one(n(6, 6)), "WIDTH (f), log"),
    ai("3453", NO_FNC1, one(n(6, 6)), "WIDTH (f), log"),
    ai("3454", NO_FNC1, one(n(6, 6)), "WIDTH (f), log"),
    ai("3455", NO_FNC1, one(n(6, 6)), "WIDTH (f), log"),
    ai("3460", NO_FNC1, one(n(6, 6)), "WIDTH (y), log"),
    ai("3461", NO_FNC1, one(n(6, 6)), "WIDTH (y), log"),
    ai("3462", NO_FNC1, one(n(6, 6)), "WIDTH (y), log"),
    ai("3463", NO_FNC1, one(n(6, 6)), "WIDTH (y), log"),
    ai("3464", NO_FNC1, one(n(6, 6)), "WIDTH (y), log"),
    ai("3465", NO_FNC1, one(n(6, 6)), "WIDTH (y), log"),
    ai("3470", NO_FNC1, one(n(6, 6)), "HEIGHT (i), log"),
    ai("3471", NO_FNC1, one(n(6, 6)), "HEIGHT (i), log"),
    ai("3472", NO_FNC1, one(n(6, 6)), "HEIGHT (i), log"),
    ai("3473", NO_FNC1, one(n(6, 6)), "HEIGHT (i), log"),
    ai("3474", NO_FNC1, one(n(6, 6)), "HEIGHT (i), log"),
    ai("3475", NO_FNC1, one(n(6, 6)), "HEIGHT (i), log"),
    ai("3480", NO_FNC1, one(n(6, 6)), "HEIGHT (f), log"),
    ai("3481", NO_FNC1, one(n(6, 6)), "HEIGHT (f), log"),
    ai("3482", NO_FNC1, one(n(6, 6)), "HEIGHT (f), log"),
    ai("3483", NO_FNC1, one(n(6, 6)), "HEIGHT (f), log"),
    ai("3484", NO_FNC1, one(n(6, 6)), "HEIGHT (f), log"),
    ai("3485", NO_FNC1, one(n(6, 6)), "HEIGHT (f), log"),
    ai("3490", NO_FNC1, one(n(6, 6)), "HEIGHT (y), log"),
    ai("3491", NO_FNC1, one(n(6, 6)), "HEIGHT (y), log"),
    ai("3492", NO_FNC1, one(n(6, 6)), "HEIGHT (y), log"),
    ai("3493", NO_FNC1, one(n(6, 6)), "HEIGHT (y), log"),
    ai("3494", NO_FNC1, one(n(6, 6)), "HEIGHT (y), log"),
    ai("3495", NO_FNC1, one(n(6, 6)), "HEIGHT (y), log"),
    ai("3500", NO_FNC1, one(n(6, 6)), "AREA (i^2)"),
    ai("3501", NO_FNC1, one(n(6, 6)), "AREA (i^2)"),
    ai("3502", NO_FNC1, one(n(6, 6)), "AREA (i^2)"),
    ai("3503", NO_FNC1, one(n(6, 6)), "AREA (i^2)"),
    ai("3504", NO_FNC1, one(n(6, 6)), "AREA (i^2)"),
    ai("3505", NO_FNC1, one(n(6, 6)), "AREA (i^2)"),
    ai("3510", NO_FNC1, one(n(6, 6)), "AREA (f^2)"),
    ai("3511", NO_FNC1, one(n(6, 6)), "AREA (f^2)"),
    ai("3512", NO_FNC1, one(n(6, 6)), "AREA (f^2)"),
    ai("3513", NO_FNC1, one(n(6, 6)), "AREA (f^2)"),
    ai("3514", NO_FNC1, one(n(6, 6)), "AREA (f^2)"),
    ai("3515", NO_FNC1, one(n(6, 6)), "AREA (f^2)"),
    ai("3520", NO_FNC1, one(n(6, 6)), "AREA (y^2)"),
    ai("3521", NO_FNC1, one(n(6, 6)), "AREA (y^2)"),
    ai("3522", NO_FNC1, one(n(6, 6)), "AREA (y^2)"),
    ai("3523", NO_FNC1, one(n(6, 6)), "AREA (y^2)"),
    ai("3524", NO_FNC1, one(n(6, 6)), "AREA (y^2)"),
    ai("3525", NO_FNC1, one(n(6, 6)), "AREA (y^2)"),
    ai("3530", NO_FNC1, one(n(6, 6)), "AREA (i^2), log"),
    ai("3531", NO_FNC1, one(n(6, 6)), "AREA (i^2), log"),
    ai("3532", NO_FNC1, one(n(6, 6)), "AREA (i^2), log"),
    ai("3533", NO_FNC1, one(n(6, 6)), "AREA (i^2), log"),
    ai("3534", NO_FNC1, one(n(6, 6)), "AREA (i^2), log"),
    ai("3535", NO_FNC1, one(n(6, 6)), "AREA (i^2), log"),
    ai("3540", NO_FNC1, one(n(6, 6)), "AREA (f^2), log"),
    ai("3541", NO_FNC1, one(n(6, 6)), "AREA (f^2), log"),
    ai("3542", NO_FNC1, one(n(6, 6)), "AREA (f^2), log"),
    ai("3543", NO_FNC1, one(n(6, 6)), "AREA (f^2), log"),
    ai("3544", NO_FNC1, one(n(6, 6)), "AREA (f^2), log"),
    ai("3545", NO_FNC1, one(n(6, 6)), "AREA (f^2), log"),
    ai("3550", NO_FNC1, one(n(6, 6)), "AREA (y^2), log"),
    ai("3551", NO_FNC1, one(n(6, 6)), "AREA (y^2), log"),
    ai("3552", NO_FNC1, one(n(6, 6)), "AREA (y^2), log"),
    ai("3553", NO_FNC1, one(n(6, 6)), "AREA (y^2), log"),
    ai("3554", NO_FNC1, one(n(6, 6)), "AREA (y^2), log"),
    ai("3555", NO_FNC1, one(n(6, 6)), "AREA (y^2), log"),
    ai("3560", NO_FNC1, one(n(6, 6)), "NET WEIGHT (t)"),
    ai("3561", NO_FNC1, one(n(6, 6)), "NET WEIGHT (t)"),
    ai("3562", NO_FNC1, one(n(6, 6)), "NET WEIGHT (t)"),
    ai("3563", NO_FNC1, one(n(6, 6)), "NET WEIGHT (t)"),
    ai("3564", NO_FNC1, one(n(6, 6)), "NET WEIGHT (t)"),
    ai("3565", NO_FNC1, one(n(6, 6)), "NET WEIGHT (t)"),
    ai("3570", NO_FNC1, one(n(6, 6)), "NET VOLUME (oz)"),
    ai("3571", NO_FNC1, one(n(6, 6)), "NET VOLUME (oz)"),
    ai("3572", NO_FNC1, one(n(6, 6)), "NET VOLUME (oz)"),
    ai("3573", NO_FNC1, one(n(6, 6)), "NET VOLUME (oz)"),
    ai("3574", NO_FNC1, one(n(6, 6)), "NET VOLUME (oz)"),
    ai("3575", NO_FNC1, one(n(6, 6)), "NET VOLUME (oz)"),
    ai("3600", NO_FNC1, one(n(6, 6)), "NET VOLUME (q)"),
    ai("3601", NO_FNC1, one(n(6, 6)), "NET VOLUME (q)"),
    ai("3602", NO_FNC1, one(n(6, 6)), "NET VOLUME (q)"),
    ai("3603", NO_FNC1, one(n(6, 6)), "NET VOLUME (q)"),
    ai("3604", NO_FNC1, one(n(6, 6)), "NET VOLUME (q)"),
    ai("3605", NO_FNC1, one(n(6, 6)), "NET VOLUME (q)"),
    ai("3610", NO_FNC1, one(n(6, 6)), "NET VOLUME (g)"),
    ai("3611", NO_FNC1, one(n(6, 6)), "NET VOLUME (g)"),
    ai("3612", NO_FNC1, one(n(6, 6)), "NET VOLUME (g)"),
    ai("3613", NO_FNC1, one(n(6, 6)), "NET VOLUME (g)"),
    ai("3614", NO_FNC1, one(n(6, 6)), "NET VOLUME (g)"),
    ai("3615", NO_FNC1, one(n(6, 6)), "NET VOLUME (g)"),
    ai("3620", NO_FNC1, one(n(6, 6)), "VOLUME (q), log"),
    ai("3621", NO_FNC1, one(n(6, 6)), "VOLUME (q), log"),
    ai("3622", NO_FNC1, one(n(6, 6)), "VOLUME (q), log"),
    ai("3623", NO_FNC1, one(n(6, 6)), "VOLUME (q), log"),
    ai("3624", NO_FNC1, one(n(6, 6)), "VOLUME (q), log"),
    ai("3625", NO_FNC1, one(n(6, 6)), "VOLUME (q), log"),
    ai("3630", NO_FNC1, one(n(6, 6)), "VOLUME (g), log"),
    ai("3631", NO_FNC1, one(n(6, 6)), "VOLUME (g), log"),
    ai("3632", NO_FNC1, one(n(6, 6)), "VOLUME (g), log"),
    ai("3633", NO_FNC1, one(n(6, 6)), "VOLUME (g), log"),
    ai("3634", NO_FNC1, one(n(6, 6)), "VOLUME (g), log"),
    ai("3635", NO_FNC1, one(n(6, 6)), "VOLUME (g), log"),
    ai("3640", NO_FNC1, one(n(6, 6)), "VOLUME (i^3)"),
    ai("3641", NO_FNC1, one(n(6, 6)), "VOLUME (i^3)"),
    ai("3642", NO_FNC1, one(n(6, 6)), "VOLUME (i^3)"),
    ai("3643", NO_FNC1, one(n(6, 6)), "VOLUME (i^3)"),
    ai("3644", NO_FNC1, one(n(6, 6)), "VOLUME (i^3)"),
    ai("3645", NO_FNC1, one(n(6, 6)), "VOLUME (i^3)"),
    ai("3650", NO_FNC1, one(n(6, 6)), "VOLUME (f^3)"),
    ai("3651", NO_FNC1, one(n(6, 6)), "VOLUME (f^3)"),
    ai("3652", NO_FNC1, one(n(6, 6)), "VOLUME (f^3)"),
    ai("3653", NO_FNC1, one(n(6, 6)), "VOLUME (f^3)"),
    ai("3654", NO_FNC1, one(n(6, 6)), "VOLUME (f^3)"),
    ai("3655", NO_FNC1, one(n(6, 6)), "VOLUME (f^3)"),
    ai("3660", NO_FNC1, one(n(6, 6)), "VOLUME (y^3)"),
    ai("3661", NO_FNC1, one(n(6, 6)), "VOLUME (y^3)"),
    ai("3662", NO_FNC1, one(n(6, 6)), "VOLUME (y^3)"),
    ai("3663", NO_FNC1, one(n(6, 6)), "VOLUME (y^3)"),
    ai("3664", NO_FNC1, one(n(6, 6)), "VOLUME (y^3)"),
    ai("3665", NO_FNC1, one(n(6, 6)), "VOLUME (y^3)"),
    ai("3670", NO_FNC1, one(n(6, 6)), "VOLUME (i^3), log"),
    ai("3671", NO_FNC1, one(n(6, 6)), "VOLUME (i^3), log"),
    ai("3672", NO_FNC1, one(n(6, 6)), "VOLUME (i^3), log"),
    ai("3673", NO_FNC1, one(n(6, 6)), "VOLUME (i^3), log"),
    ai("3674", NO_FNC1, one(n(6, 6)), "VOLUME (i^3), log"),
    ai("3675", NO_FNC1, one(n(6, 6)), "VOLUME (i^3), log"),
    ai("3680", NO_FNC1, one(n(6, 6)), "VOLUME (f^3), log"),
    ai("3681", NO_FNC1, one(n(6, 6)), "VOLUME (f^3), log"),
    ai("3682", NO_FNC1, one(n(6, 6)), "VOLUME (f^3), log"),
    ai("3683", NO_FNC1, one(n(6, 6)), "VOLUME (f^3), log"),
    ai("3684", NO_FNC1, one(n(6, 6)), "VOLUME (f^3), log"),
    ai("3685", NO_FNC1, one(n(6, 6)), "VOLUME (f^3), log"),
    ai("3690", NO_FNC1, one(n(6, 6)), "VOLUME (y^3), log"),
    ai("3691", NO_FNC1, one(n(6, 6)), "VOLUME (y^3), log"),
    ai("3692", NO_FNC1, one(n(6, 6)), "VOLUME (y^3), log"),
    ai("3693", NO_FNC1, one(n(6, 6)), "VOLUME (y^3), log"),
    ai("3694", NO_FNC1, one(n(6, 6)), "VOLUME (y^3), log"),
    ai("3695", NO_FNC1, one(n(6, 6)), "VOLUME (y^3), log"),
    ai("37", FNC1, one(n(1, 8)), "COUNT"),
    ai("3900", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3901", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3902", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3903", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3904", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3905", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3906", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3907", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3908", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3909", FNC1, one(n(1, 15)), "AMOUNT"),
    ai("3910", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3911", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3912", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3913", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3914", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3915", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3916", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3917", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3918", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3919", FNC1, two(n(3, 3), n(1, 15)), "AMOUNT"),
    ai("3920", FNC1, one(n(1, 15)), "PRICE"),
    ai("3921", FNC1, one(n(1, 15)), "PRICE"),
    ai("3922", FNC1, one(n(1, 15)), "PRICE"),
    ai("3923", FNC1, one(n(1, 15)), "PRICE"),
    ai("3924", FNC1, one(n(1, 15)), "PRICE"),
    ai("3925", FNC1, one(n(1, 15)), "PRICE"),
    ai("3926", FNC1, one(n(1, 15)), "PRICE"),
    ai("3927", FNC1, one(n(1, 15)), "PRICE"),
    ai("3928", FNC1, one(n(1, 15)), "PRICE"),
    ai("3929", FNC1, one(n(1, 15)), "PRICE"),
    ai("3930", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3931", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3932", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3933", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3934", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3935", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3936", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3937", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3938", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3939", FNC1, two(n(3, 3), n(1, 15)), "PRICE"),
    ai("3940", FNC1, one(n(4, 4)), "PRCNT OFF"),
    ai("3941", FNC1, one(n(4, 4)), "PRCNT OFF"),
    ai("3942", FNC1, one(n(4, 4)), "PRCNT OFF"),
    ai("3943", FNC1, one(n(4, 4)), "PRCNT OFF"),
    ai("3950", FNC1, one(n(6, 6)), "PRICE/UoM"),
    ai("3951", FNC1, one(n(6, 6)), "PRICE/UoM"),
    ai("3952", FNC1, one(n(6, 6)), "PRICE/UoM"),
    ai("3953", FNC1, one(n(6, 6)), "PRICE/UoM"),
    ai("3954", FNC1, one(n(6, 6)), "PRICE/UoM"),
    ai("3955", FNC1, one(n(6, 6)), "PRICE/UoM"),
    ai("400", FNC1, one(x(1, 30)), "ORDER NUMBER"),
    ai("401", FNC1, one(x(1, 30)), "GINC"),
    ai("402", FNC1, one(n_csum(17, 17)), "GSIN"),
    ai("403", FNC1, one(x(1, 30)), "ROUTE"),
    ai("410", NO_FNC1, one(n_csum(13, 13)), "SHIP TO LOC"),
    ai("411", NO_FNC1, one(n_csum(13, 13)), "BILL TO"),
    ai("412", NO_FNC1, one(n_csum(13, 13)), "PURCHASE FROM"),
    ai("413", NO_FNC1, one(n_csum(13, 13)), "SHIP FOR LOC"),
    ai("414", NO_FNC1, one(n_csum(13, 13)), "LOC NO."),
    ai("415", NO_FNC1, one(n_csum(13, 13)), "PAY TO"),
    ai("416", NO_FNC1, one(n_csum(13, 13)), "PROD/SERV LOC"),
    ai("417", NO_FNC1, one(n_csum(13, 13)), "PARTY"),
    ai("420", FNC1, one(x(1, 20)), "SHIP TO POST"),
    ai("421", FNC1, two(n(3, 3), x(1, 9)), "SHIP TO POST"),
    ai("422", FNC1, one(n(3, 3)), "ORIGIN"),
    ai("423", FNC1, one(n(3, 15)), "COUNTRY - INITIAL PROCESS"),
    ai("424", FNC1, one(n(3, 3)), "COUNTRY - PROCESS"),
    ai("425", FNC1, one(n(3, 15)), "COUNTRY - DISASSEMBLY"),
    ai("426", FNC1, one(n(3, 3)), "COUNTRY - FULL PROCESS"),
    ai("427", FNC1, one(x(1, 3)), "ORIGIN SUBDIVISION"),
    ai("4300", FNC1, one(x(1, 35)), "SHIP TO COMP"),
    ai("4301", FNC1, one(x(1, 35)), "SHIP TO NAME"),
    ai("4302", FNC1, one(x(1, 70)), "SHIP TO ADD1"),
    ai("4303", FNC1, one(x(1, 70)), "SHIP TO ADD2"),
    ai("4304", FNC1, one(x(1, 70)), "SHIP TO SUB"),
    ai("4305", FNC1, one(x(1, 70)), "SHIP TO LOC"),
    ai("4306", FNC1, one(x(1, 70)), "SHIP TO REG"),
    ai("4307", FNC1, one(x(2, 2)), "SHIP TO COUNTRY"),
    ai("4308", FNC1, one(x(1, 30)), "SHIP TO PHONE"),
    ai("4310", FNC1, one(x(1, 35)), "RTN TO COMP"),
    ai("4311", FNC1, one(x(1, 35)), "RTN TO NAME"),
    ai("4312", FNC1, one(x(1, 70)), "RTN TO ADD1"),
    ai("4313", FNC1, one(x(1, 70)), "RTN TO ADD2"),
    ai("4314", FNC1, one(x(1, 70)), "RTN TO SUB"),
    ai("4315", FNC1, one(x(1, 70)), "RTN TO LOC"),
    ai("4316", FNC1, one(x(1, 70)), "RTN TO REG"),
    ai("4317", FNC1, one(x(2, 2)), "RTN TO COUNTRY"),
    ai("4318", FNC1, one(x(1, 20)), "RTN TO POST"),
    ai("4319", FNC1, one(x(1, 30)), "RTN TO PHONE"),
    ai("4320", FNC1, one(x(1, 35)), "SRV DESCRIPTION"),
    ai("4321", FNC1, one(n(1, 1)), "DANGEROUS GOODS"),
    ai("4322", FNC1, one(n(1, 1)), "AUTH LEAVE"),
    ai("4323", FNC1, one(n(1, 1)), "SIG REQUIRED"),
    ai("4324", FNC1, two(n(6, 6), n(4, 4)), "NBEF DEL DT."),
    ai("4325", FNC1, two(n(6, 6), n(4, 4)), "NAFT DEL DT."),
    ai("4326", FNC1, one(n(6, 6)), "REL DATE"),
    ai("7001", FNC1, one(n(13, 13)), "NSN"),
    ai("7002", FNC1, one(x(1, 30)), "MEAT CUT"),
    ai("7003", FNC1, two(n(6, 6), n(4, 4)), "EXPIRY TIME"),
    ai("7004", FNC1, one(n(1, 4)), "ACTIVE POTENCY"),
    ai("7005", FNC1, one(x(1, 12)), "CATCH AREA"),
    ai("7006", FNC1, one(n(6, 6)), "FIRST FREEZE DATE"),
    ai("7007", FNC1, two(n(6, 6), n(0, 6)), "HARVEST DATE"),
    ai("7008", FNC1, one(x(1, 3)), "AQUATIC SPECIES"),
    ai("7009", FNC1, one(x(1, 10)), "FISHING GEAR TYPE"),
    ai("7010", FNC1, one(x(1, 2)), "PROD METHOD"),
    ai("7020", FNC1, one(x(1, 20)), "REFURB LOT"),
    ai("7021", FNC1, one(x(1, 20)), "FUNC STAT"),
    ai("7022", FNC1, one(x(1, 20)), "REV STAT"),
    ai("7023", FNC1, one(x(1, 30)), "GIAI - ASSEMBLY"),
    ai("7030", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7031", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7032", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7033", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7034", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7035", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7036", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7037", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7038", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7039", FNC1, two(n(3, 3), x(1, 27)), "PROCESSOR # s"),
    ai("7040", FNC1, four(n(1, 1), x(1, 1), x(1, 1), x(1, 1)), "UIC+EXT"),
    ai("710", FNC1, one(x(1, 20)), "NHRN PZN"),
    ai("711", FNC1, one(x(1, 20)), "NHRN CIP"),
    ai("712", FNC1, one(x(1, 20)), "NHRN CN"),
    ai("713", FNC1, one(x(1, 20)), "NHRN DRN"),
    ai("714", FNC1, one(x(1, 20)), "NHRN AIM"),
    ai("7230", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7231", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7232", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7233", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7234", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7235", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7236", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7237", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7238", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7239", FNC1, two(x(2, 2), x(1, 28)), "CERT # s"),
    ai("7240", FNC1, one(x(1, 20)), "PROTOCOL"),
    ai("8001", FNC1, five(n(4, 4), n(5, 5), n(3, 3), n(1, 1), n(1, 1)), "DIMENSIONS"),
    ai("8002", FNC1, one(x(1, 20)), "CMT NO."),
    ai("8003", FNC1, three(n(1, 1), n_csum(13, 13), x(0, 16)), "GRAI"),
    ai("8004", FNC1, one(x(1, 30)), "GIAI"),
    ai("8005", FNC1, one(n(6, 6)), "PRICE PER UNIT"),
    ai("8006", FNC1, two(n_csum(14, 14), n(4, 4)), "ITIP"),
    ai("8007", FNC1, one(x(1, 34)), "IBAN"),
    ai("8008", FNC1, two(n(8, 8), n(0, 4)), "PROD TIME"),
    ai("8009", FNC1, one(x(1, 50)), "OPTSEN"),
    ai("8010", FNC1, one(c(1, 30)), "CPID"),
    ai("8011", FNC1, one(n(1, 12)), "CPID SERIAL"),
    ai("8012", FNC1, one(x(1, 20)), "VERSION"),
    ai("8013", FNC1, one(x(1, 25)), "GMN"),
    ai("8017", FNC1, one(n_csum(18, 18)), "GSRN - PROVIDER"),
    ai("8018", FNC1, one(n_csum(18, 18)), "GSRN - RECIPIENT"),
    ai("8019", FNC1, one(n(1, 10)), "SRIN"),
    ai("8020", FNC1, one(x(1, 25)), "REF NO."),
    ai("8026", FNC1, two(n_csum(14, 14), n(4, 4)), "ITIP CONTENT"),
    ai("8110", FNC1, one(x(1, 70)), ""),
    ai("8111", FNC1, one(n(4, 4)), "POINTS"),
    ai("8112", FNC1, one(x(1, 70)), ""),
    ai("8200", FNC1, one(x(1, 70)), "PRODUCT URL"),
    ai("90", FNC1, one(x(1, 30)), "INTERNAL"),
    ai("91", FNC1, one(x(1, 90)), "INTERNAL"),
    ai("92", FNC1, one(x(1, 90)), "INTERNAL"),
    ai("93", FNC1, one(x(1, 90)), "INTERNAL"),
    ai("94", FNC1, one(x(1, 90)), "INTERNAL"),
    ai("95", FNC1, one(x(1, 90)), "INTERNAL"),
    ai("96", FNC1, one(x(1, 90)), "INTERNAL"),
    ai("97", FNC1, one(x(1, 90)), "INTERNAL"),
    ai("98", FNC1, one(x(1, 90)), "INTERNAL"),
    ai("99", FNC1, one(x(1, 90)), "INTERNAL"),
];

/// Look up an AI table entry by key, or by a prefix of arbitrary data.
///
/// With `ailen > 0` the first `ailen` bytes of `data` must equal a key of
/// exactly that length. With `ailen == 0` any entry whose key is a prefix
/// of `data` matches. First win over table order.
pub fn lookup_ai_entry(data: &[u8], ailen: usize) -> Option<&'static AiEntry> {
    AI_TABLE.iter().find(|entry| {
        let key = entry.ai.as_bytes();
        if ailen != 0 && ailen != key.len() {
            return false;
        }
        data.len() >= key.len() && data[..key.len()] == *key
    })
}
