//! Controlled terminology used to classify study graph instances.

/// Organization type: Clinical Study Sponsor
pub const SPONSOR_ORGANIZATION: &str = "C70793";
/// Organization type: Regulatory Agency
pub const REGULATORY_AGENCY: &str = "C188863";
/// Organization type: Clinical Study Registry
pub const CLINICAL_STUDY_REGISTRY: &str = "C93453";

/// Study title types
pub const OFFICIAL_TITLE: &str = "C207616";
pub const BRIEF_TITLE: &str = "C207615";
pub const ACRONYM: &str = "C207646";

/// Governance date: Sponsor Approval Date
pub const SPONSOR_APPROVAL_DATE: &str = "C132352";

/// Geographic scope types
pub const GLOBAL_SCOPE: &str = "C68846";
pub const COUNTRY_SCOPE: &str = "C25464";
pub const REGION_SCOPE: &str = "C41129";

/// Eligibility criterion categories
pub const INCLUSION_CRITERIA: &str = "C25532";
pub const EXCLUSION_CRITERIA: &str = "C25370";

/// Study role decodes
pub const ROLE_SPONSOR: &str = "Sponsor";
pub const ROLE_CO_SPONSOR: &str = "Co-Sponsor";
pub const ROLE_LOCAL_SPONSOR: &str = "Local Sponsor";
pub const ROLE_DEVICE_MANUFACTURER: &str = "Device Manufacturer";
pub const ROLE_MEDICAL_EXPERT: &str = "Medical Expert";

/// Extension attribute carrying the sponsor confidentiality statement
pub const CONFIDENTIALITY_STATEMENT_URL: &str =
    "http://www.cdisc.org/USDM/sponsorConfidentialityStatement";
