//! Default configuration template with all options documented.
//!
//! Written by `framecast config init`. Every value matches the built-in
//! default, so an untouched file behaves exactly like no file at all.

/// The documented default `framecast.toml`.
#[must_use]
pub fn default_config_template() -> String {
    r##"# Framecast Configuration
# =======================
# Every option is listed with its default value.
#
# Environment variable substitution is supported: ${ENV_VAR} or ${ENV_VAR:-default}
# Example: api_key = "${GEMINI_API_KEY}"

# ══════════════════════════════════════════════════════════════════════════════
# API
# ══════════════════════════════════════════════════════════════════════════════

[api]
# api_key = "${GEMINI_API_KEY}"   # Falls back to GEMINI_API_KEY, then API_KEY
base_url = "https://generativelanguage.googleapis.com/v1beta"

# ══════════════════════════════════════════════════════════════════════════════
# IMAGE GENERATION
# ══════════════════════════════════════════════════════════════════════════════

[image]
model = "imagen-4.0-generate-001"
output_mime_type = "image/jpeg"   # "image/jpeg" or "image/png"
aspect_ratio = "16:9"             # "16:9", "9:16", "1:1", "4:3", "3:4"

# ══════════════════════════════════════════════════════════════════════════════
# VIDEO GENERATION
# ══════════════════════════════════════════════════════════════════════════════

[video]
model = "veo-3.1-fast-generate-preview"   # references mode always uses veo-3.1-generate-preview
aspect_ratio = "16:9"             # "16:9" or "9:16" (references mode forces 16:9)
resolution = "720p"               # "720p" or "1080p" (references and extend force 720p)

# ══════════════════════════════════════════════════════════════════════════════
# POLLING
# ══════════════════════════════════════════════════════════════════════════════

[polling]
interval_secs = 10                # Delay between operation status checks
timeout_secs = 0                  # Give up after this long; 0 waits indefinitely

# ══════════════════════════════════════════════════════════════════════════════
# OUTPUT
# ══════════════════════════════════════════════════════════════════════════════

[output]
dir = "framecast-output"          # Generated images, videos, and video handles
"##
    .to_string()
}
