//! Fixed self-study questionnaire: sections, scored items, and reference lists.

use serde::{Deserialize, Serialize};

/// Questionnaire section. Declaration order is catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Academic,
    Staffing,
    Facilities,
    Library,
    Funding,
    Research,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Academic,
        Section::Staffing,
        Section::Facilities,
        Section::Library,
        Section::Funding,
        Section::Research,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Section::Academic => "Academic Content",
            Section::Staffing => "Staffing",
            Section::Facilities => "Facilities",
            Section::Library => "Library",
            Section::Funding => "Funding",
            Section::Research => "Research",
        }
    }

    pub fn items(self) -> impl Iterator<Item = &'static ItemDefinition> {
        QUESTIONNAIRE
            .iter()
            .filter(move |item| item.section == self)
    }
}

/// A scored questionnaire item. `key` doubles as the training column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemDefinition {
    pub section: Section,
    pub code: &'static str,
    pub key: &'static str,
    pub question: &'static str,
}

const fn item(
    section: Section,
    code: &'static str,
    key: &'static str,
    question: &'static str,
) -> ItemDefinition {
    ItemDefinition {
        section,
        code,
        key,
        question,
    }
}

pub const QUESTIONNAIRE: &[ItemDefinition] = &[
    item(Section::Academic, "a1", "curriculum_aligned_with_BMAS", "Curriculum aligned with BMAS?"),
    item(Section::Academic, "a2", "innovative_courses_present", "Innovative courses incorporated?"),
    item(Section::Academic, "a3", "curriculum_coverage_complete", "Curriculum coverage complete?"),
    item(Section::Academic, "a4", "admission_requirements_compliant", "Admission requirements compliant?"),
    item(Section::Academic, "a5", "academic_regulations_defined", "Academic regulations documented?"),
    item(Section::Academic, "a6", "tests_and_examinations_standardized", "Assessment standardized?"),
    item(Section::Academic, "a7", "evaluation_methods_clear", "Evaluation methods clear?"),
    item(Section::Academic, "a8", "degree_projects_adequate", "Degree projects adequate?"),
    item(Section::Academic, "a9", "practical_work_adequate", "Practical training adequate?"),
    item(Section::Academic, "a10", "student_course_evaluation_present", "Student evaluation implemented?"),
    item(Section::Academic, "a11", "skills_acquisition_programme", "Skills acquisition structured?"),
    item(Section::Academic, "a12", "external_examiner_system", "External examiner system active?"),
    item(Section::Academic, "a13", "internal_quality_assurance", "Internal QA functional?"),
    item(Section::Staffing, "s1", "proportion_core_staff_sufficient", "Core staff proportion sufficient?"),
    item(Section::Staffing, "s2", "staff_rank_mix_balanced", "Staff rank mix balanced?"),
    item(Section::Staffing, "s3", "academic_staff_qualification_high", "Staff qualification adequate?"),
    item(Section::Staffing, "s4", "staff_competence_verified", "Staff competence verified?"),
    item(Section::Staffing, "s5", "administrative_support_available", "Administrative support adequate?"),
    item(Section::Staffing, "s6", "non_teaching_staff_adequate", "Non-teaching staff sufficient?"),
    item(Section::Staffing, "s7", "academic_staff_development_programme", "Staff development active?"),
    item(Section::Staffing, "s8", "non_academic_staff_development_programme", "Non-academic training ongoing?"),
    item(Section::Facilities, "f1", "laboratory_space_adequate", "Laboratory space adequate?"),
    item(Section::Facilities, "f2", "laboratory_equipment_adequate", "Laboratory equipment adequate?"),
    item(Section::Facilities, "f3", "classroom_space_adequate", "Classroom space adequate?"),
    item(Section::Facilities, "f4", "classroom_equipment_adequate", "Classroom equipment adequate?"),
    item(Section::Facilities, "f5", "office_accommodation_adequate", "Office accommodation adequate?"),
    item(Section::Facilities, "f6", "safety_environment_present", "Safety environment compliant?"),
    item(Section::Library, "l1", "library_holdings_adequate", "Library holdings adequate?"),
    item(Section::Library, "l2", "library_material_current", "Library materials current?"),
    item(Section::Library, "l3", "e_library_subscription_available", "E-library subscription available?"),
    item(Section::Library, "l4", "e_library_access_good", "E-library access reliable?"),
    item(Section::Funding, "fd1", "programme_funding_adequate", "Programme funding adequate?"),
    item(Section::Funding, "fd2", "budget_release_regular", "Budget release regular?"),
    item(Section::Funding, "fd3", "equipment_maintenance_budget_available", "Maintenance budget available?"),
    item(Section::Research, "r1", "research_collaboration_active", "Research collaboration active?"),
    item(Section::Research, "r2", "research_output_present", "Research output evident?"),
    item(Section::Research, "r3", "employer_rating_positive", "Employer rating positive?"),
    item(Section::Research, "r4", "tracer_study_available", "Tracer study available?"),
];

/// Derived answer key for staff-student ratio compliance.
pub const STAFF_RATIO_KEY: &str = "staff_student_ratio_compliant";

/// Categorical answer key, one-hot expanded as `discipline_<name>`.
pub const DISCIPLINE_KEY: &str = "discipline";

/// Resolve a form code (`a1`) or column key to its catalog entry.
pub fn lookup(key_or_code: &str) -> Option<&'static ItemDefinition> {
    let needle = key_or_code.trim();
    QUESTIONNAIRE
        .iter()
        .find(|item| item.key == needle || item.code.eq_ignore_ascii_case(needle))
}

/// Academic discipline groupings the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discipline {
    Computing,
    Education,
    Engineering,
    Management,
    Science,
}

impl Discipline {
    pub const ALL: [Discipline; 5] = [
        Discipline::Computing,
        Discipline::Education,
        Discipline::Engineering,
        Discipline::Management,
        Discipline::Science,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Discipline::Computing => "Computing",
            Discipline::Education => "Education",
            Discipline::Engineering => "Engineering",
            Discipline::Management => "Management",
            Discipline::Science => "Science",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ALL
            .into_iter()
            .find(|discipline| discipline.name().eq_ignore_ascii_case(needle))
    }
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub const INSTITUTIONS: &[&str] = &[
    "Abia State University",
    "Abubakar Tafawa Balewa University",
    "Adekunle Ajasin University",
    "Afe Babalola University",
    "Ahmadu Bello University",
    "Ajayi Crowther University",
    "American University of Nigeria",
    "Babcock University",
    "Bayero University Kano",
    "Benson Idahosa University",
    "Benue State University",
    "Bowen University",
    "Covenant University",
    "Delta State University",
    "Ekiti State University",
    "Federal University of Technology Akure",
    "Federal University of Technology Minna",
    "Federal University of Technology Owerri",
    "Igbinedion University",
    "Kaduna State University",
    "Kogi State University",
    "Lagos State University",
    "Lead City University",
    "Madonna University",
    "Nile University of Nigeria",
    "Nnamdi Azikiwe University",
    "Obafemi Awolowo University",
    "Pan Atlantic University",
    "Rivers State University",
    "University of Abuja",
    "University of Benin",
    "University of Calabar",
    "University of Ibadan",
    "University of Ilorin",
    "University of Jos",
    "University of Lagos",
    "University of Maiduguri",
    "University of Nigeria Nsukka",
    "University of Port Harcourt",
    "University of Uyo",
];

pub const PROGRAMMES: &[&str] = &[
    "Accounting",
    "Adult Education",
    "Agricultural Engineering",
    "Banking and Finance",
    "Biochemistry",
    "Biology",
    "Biomedical Engineering",
    "Business Administration",
    "Chemical Engineering",
    "Chemistry",
    "Civil Engineering",
    "Computer Science",
    "Curriculum Studies",
    "Cybersecurity",
    "Data Science",
    "Economics",
    "Educational Management",
    "Electrical Engineering",
    "Geology",
    "Guidance and Counselling",
    "Information Technology",
    "Mathematics",
    "Mechanical Engineering",
    "Mechatronics Engineering",
    "Microbiology",
    "Petroleum Engineering",
    "Physics",
    "Public Administration",
    "Software Engineering",
    "Statistics",
];

/// Serializable snapshot of the questionnaire for clients building forms.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub sections: Vec<SectionView>,
    pub disciplines: Vec<&'static str>,
    pub institutions: &'static [&'static str],
    pub programmes: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub section: Section,
    pub label: &'static str,
    pub items: Vec<ItemDefinition>,
}

impl CatalogView {
    pub fn current() -> Self {
        Self {
            sections: Section::ALL
                .into_iter()
                .map(|section| SectionView {
                    section,
                    label: section.label(),
                    items: section.items().copied().collect(),
                })
                .collect(),
            disciplines: Discipline::ALL.into_iter().map(Discipline::name).collect(),
            institutions: INSTITUTIONS,
            programmes: PROGRAMMES,
        }
    }
}
