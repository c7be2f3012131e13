use serde_json::{json, Value};

use crate::models::collection::Collection;
use crate::models::document::{from_value, Document};

fn docs(values: Value) -> Vec<Document> {
    match values {
        Value::Array(items) => items.into_iter().filter_map(from_value).collect(),
        _ => Vec::new(),
    }
}

/// Sample content written into an empty database.
pub fn sample_content() -> Vec<(Collection, Vec<Document>)> {
    vec![
        (Collection::Projects, projects()),
        (Collection::Posts, posts()),
        (Collection::Videos, videos()),
        (Collection::Certificates, certificates()),
        (Collection::Jobs, jobs()),
        (Collection::Reviews, reviews()),
        (Collection::Qas, qas()),
    ]
}

fn projects() -> Vec<Document> {
    docs(json!([
        {
            "id": "sample-1",
            "title": "E-Commerce Platform",
            "description": "A modern e-commerce platform with advanced product filtering, secure payment integration, and real-time inventory management.",
            "image": "",
            "category": "Web Development",
            "featured": true,
            "tags": ["React", "Node.js", "Stripe", "MongoDB"],
            "liveUrl": "https://example.com",
            "githubUrl": "https://github.com/example"
        },
        {
            "id": "sample-2",
            "title": "Mobile Banking App",
            "description": "Mobile banking interface with biometric authentication and instant transactions.",
            "image": "",
            "category": "Mobile App",
            "featured": true,
            "tags": ["React Native", "Firebase", "Security"],
            "liveUrl": "",
            "githubUrl": ""
        },
        {
            "id": "sample-3",
            "title": "Brand Identity Design",
            "description": "Logo, color palette, typography, and brand guidelines for a fashion label.",
            "image": "",
            "category": "Branding",
            "featured": false,
            "tags": ["Figma", "Illustrator", "Branding"],
            "liveUrl": "",
            "githubUrl": ""
        },
        {
            "id": "sample-4",
            "title": "Real Estate Dashboard",
            "description": "Property management dashboard with analytics, tenant management, and financial reporting.",
            "image": "",
            "category": "UI/UX Design",
            "featured": true,
            "tags": ["UI/UX", "Dashboard", "Analytics"],
            "liveUrl": "",
            "githubUrl": ""
        }
    ]))
}

fn posts() -> Vec<Document> {
    docs(json!([
        {
            "id": "post-1",
            "title": "Getting Started with Web Development",
            "excerpt": "The fundamentals of modern web development and the tools you need.",
            "content": "Web development keeps evolving. This guide walks through the essential technologies every new web developer should learn first.",
            "thumbnail": "",
            "author": "Site Owner",
            "readTime": "5 min read",
            "tags": ["Web Dev", "Tutorial", "Beginner"]
        },
        {
            "id": "post-2",
            "title": "Design Principles for Better UX",
            "excerpt": "Key design principles that lift user experience work.",
            "content": "User experience design is about intuitive, accessible and delightful products, not only good looks.",
            "thumbnail": "",
            "author": "Site Owner",
            "readTime": "7 min read",
            "tags": ["UX", "Design"]
        },
        {
            "id": "post-3",
            "title": "The Power of Modern CSS",
            "excerpt": "Layout techniques that change how pages are built.",
            "content": "Grid, Flexbox and custom properties cover most layouts that used to need a framework.",
            "thumbnail": "",
            "author": "Site Owner",
            "readTime": "6 min read",
            "tags": ["CSS", "Frontend"]
        }
    ]))
}

fn videos() -> Vec<Document> {
    docs(json!([
        {
            "id": "video-sample-1",
            "title": "Building Modern Web Apps",
            "youtubeUrl": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "description": "Building a responsive web application from setup to deployment."
        }
    ]))
}

fn certificates() -> Vec<Document> {
    docs(json!([
        {
            "id": "cert-1",
            "title": "Advanced React Development",
            "issuer": "Meta",
            "date": "2024",
            "image": "",
            "credentialUrl": ""
        },
        {
            "id": "cert-2",
            "title": "UI/UX Design Specialization",
            "issuer": "Google",
            "date": "2023",
            "image": "",
            "credentialUrl": ""
        }
    ]))
}

fn jobs() -> Vec<Document> {
    docs(json!([
        {
            "id": "job-1",
            "title": "Senior UI/UX Designer & Full Stack Developer",
            "company": "Freelance",
            "period": "2022 - Present",
            "description": "Design and development for clients, from research to shipped web applications.",
            "skills": ["Figma", "React", "Node.js", "TypeScript"],
            "achievements": ["Delivered 50+ projects"],
            "current": true
        },
        {
            "id": "job-2",
            "title": "Lead Frontend Developer",
            "company": "Tech Innovations Inc.",
            "period": "2020 - 2022",
            "description": "Led the frontend team and set code quality and performance practices.",
            "skills": ["React", "Redux", "TypeScript", "Testing"],
            "achievements": ["Reduced load time by 40%"],
            "current": false
        },
        {
            "id": "job-3",
            "title": "UI/UX Designer",
            "company": "Creative Studio",
            "period": "2018 - 2020",
            "description": "Interfaces for web and mobile, user research and interactive prototypes.",
            "skills": ["Figma", "Sketch", "Prototyping"],
            "achievements": ["Redesigned 3 major products"],
            "current": false
        }
    ]))
}

fn reviews() -> Vec<Document> {
    docs(json!([
        {
            "id": "review-1",
            "name": "John Anderson",
            "role": "CEO",
            "company": "Startup Inc",
            "review": "Delivered beyond our expectations, with real attention to detail.",
            "rating": 5,
            "avatar": ""
        },
        {
            "id": "review-2",
            "name": "Sarah Mitchell",
            "role": "Product Manager",
            "company": "Tech Solutions",
            "review": "Understood our vision and shipped it with clean design and code.",
            "rating": 5,
            "avatar": ""
        },
        {
            "id": "review-3",
            "name": "Michael Chen",
            "role": "Marketing Director",
            "company": "Digital Agency",
            "review": "Turned an outdated website into a fast, modern platform.",
            "rating": 5,
            "avatar": ""
        }
    ]))
}

fn qas() -> Vec<Document> {
    docs(json!([
        {
            "id": "qa-1",
            "question": "What services do you offer?",
            "answer": "UI/UX design, web development, mobile app development, branding, digital marketing, SEO and e-commerce solutions.",
            "category": "Services",
            "order": 1
        },
        {
            "id": "qa-2",
            "question": "How long does a typical project take?",
            "answer": "A landing page takes 1-2 weeks, a full website 3-6 weeks, and larger applications 2-4 months.",
            "category": "Timeline",
            "order": 2
        },
        {
            "id": "qa-3",
            "question": "What is your design process?",
            "answer": "Discovery, wireframing, visual design, development, testing, then launch and support.",
            "category": "Process",
            "order": 3
        },
        {
            "id": "qa-4",
            "question": "Do you provide ongoing support?",
            "answer": "Yes. Every project includes 30 days of free support, and maintenance packages are available.",
            "category": "Support",
            "order": 4
        },
        {
            "id": "qa-5",
            "question": "What are your rates?",
            "answer": "Both fixed-price and hourly. Get in touch for a quote.",
            "category": "Pricing",
            "order": 5
        }
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::id_of;

    #[test]
    fn every_sample_has_an_id() {
        for (collection, docs) in sample_content() {
            assert!(!docs.is_empty(), "{} has no samples", collection);
            for d in &docs {
                assert!(id_of(d).is_some(), "{} sample without id", collection);
            }
        }
    }
}
