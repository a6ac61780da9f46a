//! Sample testimonials the in-memory store starts with.

use crate::NewTestimonial;

/// The fixed testimonials, in insertion order.
pub fn seed_testimonials() -> Vec<NewTestimonial> {
    vec![
        NewTestimonial {
            name: "Sarah Johnson".into(),
            title: "CEO".into(),
            company: "Johnson & Associates".into(),
            message: "DigitalBoost Pro transformed our online presence. Our website traffic increased by 200% and we're getting more qualified leads than ever before.".into(),
            rating: "5".into(),
            image_url: Some("https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?ixlib=rb-4.0.3&ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&auto=format&fit=crop&w=150&h=150".into()),
        },
        NewTestimonial {
            name: "Michael Chen".into(),
            title: "Owner".into(),
            company: "Chen's Restaurant".into(),
            message: "The social media management has been outstanding. Our engagement rates have skyrocketed and we're seeing real business results.".into(),
            rating: "5".into(),
            image_url: Some("https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?ixlib=rb-4.0.3&ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&auto=format&fit=crop&w=150&h=150".into()),
        },
        NewTestimonial {
            name: "David Rodriguez".into(),
            title: "Founder".into(),
            company: "Rodriguez Consulting".into(),
            message: "Professional, responsive, and results-driven. Our Google Business listing is now ranking #1 for our key terms. Highly recommended!".into(),
            rating: "5".into(),
            image_url: Some("https://images.unsplash.com/photo-1500648767791-00dcc994a43e?ixlib=rb-4.0.3&ixid=MnwxMjA3fDB8MHxwaG90by1wYWdlfHx8fGVufDB8fHx8&auto=format&fit=crop&w=150&h=150".into()),
        },
    ]
}
