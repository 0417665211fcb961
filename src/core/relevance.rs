use crate::models::Professional;

/// Check whether a skill name and an expertise domain overlap
///
/// True when either string contains the other after lowercasing. This is a
/// plain substring test: "java" is relevant to "javascript", and an empty
/// domain is relevant to every skill.
#[inline]
pub fn is_relevant(skill_name: &str, domain: &str) -> bool {
    let skill = skill_name.to_lowercase();
    let domain = domain.to_lowercase();

    domain.contains(&skill) || skill.contains(&domain)
}

/// Check a skill against a list of expertise domains
#[inline]
pub fn is_relevant_to_any<S: AsRef<str>>(skill_name: &str, domains: &[S]) -> bool {
    domains.iter().any(|domain| is_relevant(skill_name, domain.as_ref()))
}

/// Ids of the professionals with at least one domain relevant to the skill
///
/// Directory order is preserved.
pub fn filter_relevant_professionals<'a>(
    skill_name: &str,
    directory: &'a [(String, Professional)],
) -> Vec<&'a str> {
    directory
        .iter()
        .filter(|(_, professional)| {
            is_relevant_to_any(skill_name, &professional.profile.expertise_domains)
        })
        .map(|(id, _)| id.as_str())
        .collect()
}
