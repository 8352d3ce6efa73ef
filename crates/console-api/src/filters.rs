//! Case-insensitive search over fetched lists.
//!
//! An empty or blank term matches everything.

use crate::models::{Contact, IncidentType, UserAccount};

fn matcher(term: &str) -> impl Fn(&str) -> bool {
    let needle = term.trim().to_lowercase();
    move |haystack: &str| haystack.to_lowercase().contains(&needle)
}

/// Contacts whose name, type, value or description contain `term`.
pub fn filter_contacts<'a>(contacts: &'a [Contact], term: &str) -> Vec<&'a Contact> {
    let matches = matcher(term);
    contacts
        .iter()
        .filter(|c| {
            matches(&c.name)
                || matches(&c.contact_type)
                || matches(&c.value)
                || matches(&c.description)
        })
        .collect()
}

/// Users whose first name, last name or email contain `term`, optionally
/// restricted to one role id.
pub fn filter_users<'a>(
    users: &'a [UserAccount],
    term: &str,
    role_id: Option<i64>,
) -> Vec<&'a UserAccount> {
    let matches = matcher(term);
    users
        .iter()
        .filter(|u| matches(&u.first_name) || matches(&u.last_name) || matches(&u.email))
        .filter(|u| role_id.map_or(true, |role_id| u.role_id == role_id))
        .collect()
}

/// Incident types whose name or description contain `term`.
pub fn filter_incident_types<'a>(
    incidents: &'a [IncidentType],
    term: &str,
) -> Vec<&'a IncidentType> {
    let matches = matcher(term);
    incidents
        .iter()
        .filter(|i| matches(&i.name_of_incident) || matches(&i.description))
        .collect()
}
