//! Curated landing-page testimonials.

use serde::Serialize;

/// A landing-page testimonial.
#[derive(Debug, Clone, Serialize)]
pub struct Testimonial {
    pub id: u32,
    pub quote: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub avatar: &'static str,
    pub rating: u8,
    pub category: &'static str,
}

impl Testimonial {
    /// The curated set shown on the landing page.
    #[must_use]
    pub fn all() -> Vec<Self> {
        vec![
            Self {
                id: 1,
                quote: "CIRS has transformed how we manage community issues. The platform is intuitive and the real-time reporting is a game-changer for us.",
                name: "Jane Doe",
                role: "Community Manager",
                avatar: "/avatars/avatar-1.jpg",
                rating: 5,
                category: "Efficiency",
            },
            Self {
                id: 2,
                quote: "A must-have tool for any modern community. It bridges the gap between residents and management seamlessly.",
                name: "John Smith",
                role: "Resident",
                avatar: "/avatars/avatar-2.jpg",
                rating: 5,
                category: "Communication",
            },
            Self {
                id: 3,
                quote: "The mobile app is incredibly convenient. I can report a problem with a photo in under a minute. The response time has improved drastically.",
                name: "Emily White",
                role: "Homeowner",
                avatar: "/avatars/avatar-3.jpg",
                rating: 5,
                category: "Usability",
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curated_set_is_stable() {
        let all = Testimonial::all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Jane Doe");
        assert_eq!(all[1].role, "Resident");
        assert_eq!(all[2].category, "Usability");
    }
}
