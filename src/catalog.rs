use std::path::Path;

use crate::models::Project;

fn project(
    id: u32,
    title: &str,
    description: &str,
    image: &str,
    color: &str,
    tags: &[&str],
    link: &str,
) -> Project {
    Project {
        id,
        title: title.to_string(),
        description: description.to_string(),
        image: image.to_string(),
        color: color.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        link: link.to_string(),
    }
}

// Fixed project list shown on the site, rebuilt on every call
pub fn projects() -> Vec<Project> {
    vec![
        project(
            1,
            "NBA Prediction",
            "A machine learning project that predicts NBA game outcomes using player performance, team statistics, and temporal data with XGBoost.",
            "/website_thumbnail.png",
            "#C9082A",
            &["Python", "Machine Learning", "XGBoost", "Data Science", "Sports Analytics"],
            "https://github.com/Gerard-M/NBA-Prediction",
        ),
        project(
            2,
            "Agrilocate",
            "A full-stack e-commerce platform built with React, Node.js, and MongoDB.",
            "/website_thumbnail.png",
            "#FFD700",
            &["React", "Node.js", "MongoDB", "Express"],
            "https://github.com/Gerard-M/AgriLocate",
        ),
        project(
            3,
            "Visualgo",
            "A responsive portfolio website built with Next.js and Tailwind CSS.",
            "/visualgo_thumbnail.png",
            "#1E3A8A",
            &["Next.js", "Tailwind CSS", "Framer Motion"],
            "https://github.com/Gerard-M/Visualgo",
        ),
        project(
            4,
            "Web Design for Visually Impaired",
            "A task management application with drag-and-drop functionality.",
            "/website_thumbnail.png",
            "#FFD700",
            &["React", "Redux", "Firebase", "Material UI"],
            "https://gerard-m.github.io/HCI_Finals/",
        ),
    ]
}

/// Whether every project thumbnail is present under `public_dir`.
///
/// Image paths are site-absolute (`/name.png`) and resolve relative to the
/// public directory. Unreadable paths count as missing.
pub async fn images_exist(projects: &[Project], public_dir: &Path) -> bool {
    for project in projects {
        let path = public_dir.join(project.image.trim_start_matches('/'));
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return false;
        }
    }
    true
}
