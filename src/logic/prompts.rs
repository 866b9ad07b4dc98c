// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Instruction text sent to the generation service for each edit kind.

use crate::models::hotspot::Hotspot;

/// What the user asked the service to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditKind {
    /// Localized change around a selected pixel.
    Retouch { instruction: String, hotspot: Hotspot },
    /// Stylistic filter over the whole image.
    Filter { instruction: String },
    /// Global photographic adjustment.
    Adjust { instruction: String },
}

/// Built-in filter choices shown in the Filters panel.
pub const FILTER_PRESETS: &[(&str, &str)] = &[
    ("Synthwave", "Apply a vibrant 80s synthwave look with neon magenta and cyan glows and subtle scan lines."),
    ("Anime", "Give the image a vivid Japanese anime style with bold outlines, cel shading and saturated colors."),
    ("Lomo", "Apply a Lomography-style cross-processed film look with high contrast, oversaturated colors and dark vignetting."),
    ("Glitch", "Transform the image into a futuristic holographic glitch with digital distortion and chromatic aberration."),
];

/// Built-in adjustment choices shown in the Adjust panel.
pub const ADJUSTMENT_PRESETS: &[(&str, &str)] = &[
    ("Blur background", "Apply a realistic depth-of-field effect, blurring the background while keeping the main subject in sharp focus."),
    ("Enhance details", "Slightly enhance the sharpness and details of the image without making it look unnatural."),
    ("Warmer lighting", "Adjust the color temperature to give the image warmer, golden-hour style lighting."),
    ("Studio light", "Add dramatic, professional studio lighting to the main subject."),
];

const SAFETY_POLICY: &str = "Safety and ethics policy: you may adjust skin tone on request \
(for example 'give me a tan' or 'make my skin darker') as a standard photo enhancement. \
You must refuse any request to change a person's fundamental race or ethnicity.";

impl EditKind {
    /// Short label used in file names and status messages.
    pub fn label(&self) -> &'static str {
        match self {
            EditKind::Retouch { .. } => "edit",
            EditKind::Filter { .. } => "filter",
            EditKind::Adjust { .. } => "adjustment",
        }
    }

    #[cfg(test)]
    pub fn instruction(&self) -> &str {
        match self {
            EditKind::Retouch { instruction, .. }
            | EditKind::Filter { instruction }
            | EditKind::Adjust { instruction } => instruction,
        }
    }

    /// Full prompt text including the edit framing and output rules.
    pub fn prompt(&self, reference_count: usize) -> String {
        let body = match self {
            EditKind::Retouch {
                instruction,
                hotspot,
            } => format!(
                "You are an expert photo editor. Perform a natural, localized edit on the \
provided image according to the user's request.\n\
User request: \"{instruction}\"\n\
Edit location: focus on the area around pixel coordinates (x: {}, y: {}).\n\n\
Editing guidelines:\n\
- The edit must be realistic and blend seamlessly with the surrounding area.\n\
- The rest of the image outside the immediate edit area must remain identical to the original.",
                hotspot.x, hotspot.y
            ),
            EditKind::Filter { instruction } => format!(
                "You are an expert photo editor. Apply a stylistic filter to the entire image \
based on the user's request. Do not change the composition or content, only apply the style.\n\
Filter request: \"{instruction}\""
            ),
            EditKind::Adjust { instruction } => format!(
                "You are an expert photo editor. Perform a natural, global adjustment to the \
entire image based on the user's request.\n\
User request: \"{instruction}\"\n\n\
Editing guidelines:\n\
- The adjustment must be applied across the entire image.\n\
- The result must be photorealistic."
            ),
        };

        let references = match reference_count {
            0 => String::new(),
            1 => "\n\nThe image after the first one is a reference photo of the person's face. \
Preserve that person's identity and facial features in the result."
                .to_string(),
            n => format!(
                "\n\nThe {n} images after the first one are reference photos of faces. \
Preserve those people's identities and facial features in the result."
            ),
        };

        format!("{body}{references}\n\n{SAFETY_POLICY}\n\nOutput: return only the final edited image. Do not return text.")
    }
}
