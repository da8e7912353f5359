use anyhow::Result;

use super::print_json;
use crate::profile::ProfileProvider;

pub struct ProfileCommand {
    pub json: bool,
}

impl ProfileCommand {
    pub fn new() -> Self {
        Self { json: false }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn execute(&self, profiles: &dyn ProfileProvider) -> Result<()> {
        let user = profiles.require_user()?;
        if self.json {
            return print_json(&user);
        }

        println!("👤 {} ({})", user.name, user.id);
        println!("   🩸 Blood group: {}", user.blood_group);
        if user.medical_conditions.is_empty() {
            println!("   🩺 No recorded conditions");
        } else {
            println!("   🩺 Conditions: {}", user.medical_conditions.join(", "));
        }
        let contact = &user.emergency_contact;
        println!(
            "   📱 Emergency contact: {} ({}) {}",
            contact.name, contact.relation, contact.phone
        );
        Ok(())
    }
}

impl Default for ProfileCommand {
    fn default() -> Self {
        Self::new()
    }
}
