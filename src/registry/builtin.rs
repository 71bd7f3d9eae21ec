//! Built-in provider catalog.

use super::{OperationPicker, OperationSpec, ProviderSpec, Requirements};

const fn needs(prompt: bool, template_image: bool, test_image: bool) -> Requirements {
    Requirements {
        prompt,
        template_image,
        test_image,
    }
}

const fn op(label: &'static str, needs: Requirements) -> OperationSpec {
    OperationSpec {
        label,
        needs,
        supported: true,
    }
}

const fn unsupported(label: &'static str, needs: Requirements) -> OperationSpec {
    OperationSpec {
        label,
        needs,
        supported: false,
    }
}

pub(super) fn catalog() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec {
            slug: "gemini",
            label: "Gemini",
            operations: vec![
                ("style_transfer", op("Style Transfer", needs(true, true, false))),
                (
                    "identity_transfer",
                    op("Identity Transfer", needs(true, true, true)),
                ),
                ("image_edit", op("Image Edit", needs(true, false, true))),
            ],
            preferred_operation: "identity_transfer",
            picker: OperationPicker::Hidden,
        },
        ProviderSpec {
            slug: "gemini-3-pro",
            label: "Gemini 3 Pro",
            operations: vec![("image_edit", op("Image Edit", needs(true, false, true)))],
            preferred_operation: "image_edit",
            picker: OperationPicker::Hidden,
        },
        ProviderSpec {
            slug: "gpt-image-1.5",
            label: "GPT Image 1.5",
            operations: vec![("image_edit", op("Image Edit", needs(true, false, true)))],
            preferred_operation: "image_edit",
            picker: OperationPicker::Hidden,
        },
        ProviderSpec {
            slug: "turbotext",
            label: "TurboText",
            operations: vec![
                (
                    "image2image",
                    op("Image2Image (recommended)", needs(true, false, true)),
                ),
                (
                    "style_transfer",
                    unsupported("Style Transfer", needs(true, true, true)),
                ),
                (
                    "image_edit",
                    unsupported("Image Edit", needs(true, false, true)),
                ),
                (
                    "identity_transfer",
                    unsupported("Identity Transfer", needs(false, true, true)),
                ),
            ],
            preferred_operation: "image2image",
            picker: OperationPicker::Visible,
        },
    ]
}
