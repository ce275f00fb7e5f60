//! Human-readable output formatting

use crate::output::Report;

pub fn format_human(report: &Report<'_>) -> String {
    match report {
        Report::Profiles(registry) => {
            if registry.is_empty() {
                return "No OS profiles configured".to_string();
            }
            let mut output = String::from("OS Profiles\n-----------\n");
            output.push_str(&format!(
                "{:<10} {:<24} {:<20} {:<20}\n",
                "OS", "IMAGE", "DOCKERFILE", "CONTAINER"
            ));
            output.push_str(&"-".repeat(77));
            output.push('\n');
            for (os, profile) in registry.iter() {
                output.push_str(&format!(
                    "{:<10} {:<24} {:<20} {:<20}\n",
                    truncate(os, 10),
                    truncate(&format!("{}:{}", profile.image, profile.tag), 24),
                    truncate(&profile.dockerfile, 20),
                    profile.container_name
                ));
            }
            output
        }
        Report::Plan(plan) => {
            let instance = &plan.instance;
            let mut output = format!(
                "Request Plan\n\
                 ------------\n\
                 Command:   {}\n\
                 OS:        {}\n\
                 Hash:      {}\n\
                 Image:     {}\n\
                 Container: {}\n\
                 Filter:    {}",
                plan.command,
                instance.os,
                instance.instance_hash,
                instance.image_ref(),
                instance.container_name,
                instance.filter
            );
            if let Some(ref exec) = plan.exec_command {
                output.push_str(&format!("\nExec:      {}", exec));
            }
            output
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
