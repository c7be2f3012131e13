//! Aura, the rule-based chat assistant.
//!
//! A visitor's message is lowercased and tested against an ordered list of
//! topics; the first topic that matches picks the reply. Replies are built
//! from a static knowledge base about the site owner's services.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref GREETING: Regex =
        Regex::new(r"^(hi|hello|hey|greetings|good morning|good afternoon|good evening)")
            .expect("Invalid greeting pattern");
    static ref GOODBYE: Regex =
        Regex::new(r"^(bye|goodbye|see you|cya|later)").expect("Invalid goodbye pattern");
}

/// Questions answered before the assistant asks for a name and email.
pub const QUESTIONS_BEFORE_CONTACT: u32 = 4;

pub const CONTACT_PROMPT: &str = "I'd love to continue helping you! Could you please share your name and email so we can keep in touch?";

// ── Knowledge base ──────────────────────────────────────────────────

const SERVICES: &[&str] = &[
    "UI/UX Design - Beautiful, intuitive interfaces built on user-centered design principles",
    "Web Development - Responsive, fast and SEO-optimized websites on modern technologies",
    "Digital Marketing - SEO, social media marketing, content strategy and analytics",
    "Brand Identity - Logos, color palettes, typography and brand guidelines",
    "E-commerce Solutions - Online stores, payment integration and conversion optimization",
    "Mobile App Design - iOS and Android interfaces focused on usability and performance",
    "Framer Development - Interactive prototypes and production-ready Framer websites",
    "WordPress Development - Custom themes and plugins",
    "Landing Page Design - High-converting pages built for lead generation",
    "Email Marketing - Campaign design, automation and conversion optimization",
];

const SKILLS: &[&str] = &[
    "Frontend: React, Next.js, TypeScript, JavaScript, HTML5, CSS3",
    "Design Tools: Figma, Adobe XD, Sketch, Photoshop, Illustrator",
    "CSS Frameworks: Tailwind CSS, Bootstrap, SASS, Styled Components",
    "Backend: Node.js, Express, MongoDB, PostgreSQL, REST APIs",
    "CMS: WordPress, Shopify, Webflow, Framer",
    "Marketing: Google Analytics, SEO tools, Social Media, Email Marketing",
    "Version Control: Git, GitHub, GitLab",
    "Testing: Jest, Cypress, React Testing Library",
    "Performance: Web Vitals, lazy loading, code splitting",
    "Responsive Design: Mobile-first development, cross-browser compatibility",
];

const EXPERTISE: &[&str] = &[
    "User Experience (UX) Research and Testing",
    "Wireframing and Prototyping",
    "Conversion Rate Optimization (CRO)",
    "Accessibility (WCAG) Compliance",
    "Progressive Web Apps (PWA)",
    "API Integration and Development",
    "Database Design and Management",
    "Cloud Deployment (Vercel, Netlify, AWS)",
    "Performance Optimization",
    "Search Engine Optimization (SEO)",
];

const INDUSTRIES: &[&str] = &[
    "E-commerce and Retail",
    "SaaS and Technology",
    "Healthcare and Medical",
    "Finance and Banking",
    "Education and E-learning",
    "Real Estate and Property",
    "Food and Hospitality",
    "Fashion and Lifestyle",
    "Fitness and Wellness",
    "Professional Services",
];

const DELIVERABLES: &[&str] = &[
    "Source code with documentation",
    "Design files (Figma/Adobe)",
    "Responsive, mobile-friendly design",
    "SEO-optimized structure",
    "Performance optimization",
    "Cross-browser compatibility",
    "Admin/CMS training",
    "Deployment and hosting setup",
    "Post-launch support period",
    "Maintenance guidelines",
];

const WHY_CHOOSE: &[&str] = &[
    "Proven track record with 100+ successful projects",
    "Focus on both aesthetics and functionality",
    "Agile development with regular updates",
    "Clear communication throughout the project",
    "Quality code following industry best practices",
    "On-time delivery and transparent pricing",
    "Post-launch support and maintenance",
    "Continuous learning and adoption of new technologies",
];

const TIMELINES: &[&str] = &[
    "1-2 weeks for a landing page",
    "3-6 weeks for a standard website",
    "6-10 weeks for an e-commerce store",
    "8-16 weeks for a mobile app",
    "Custom timelines based on project complexity",
];

const PROCESS: &str = "Discovery & Research → Planning & Strategy → Design & Prototyping → Development → Testing & QA → Launch → Ongoing Support & Maintenance";

const PROCESS_DETAILS: &[(&str, &str)] = &[
    ("Discovery", "Understanding your goals, audience, competitors and requirements"),
    ("Design", "Wireframes, mockups and interactive prototypes with feedback cycles"),
    ("Development", "Clean, maintainable code under version control with regular updates"),
    ("Testing", "Testing across devices and browsers, plus performance tuning"),
    ("Launch", "Production deployment with monitoring, analytics and documentation"),
    ("Support", "Maintenance, updates, bug fixes and new features as needed"),
];

const EXPERIENCE: &str = "Over 5 years of professional experience in design and development, working with clients worldwide in e-commerce, SaaS, healthcare, finance, education and real estate";
const AVAILABILITY: &str = "Currently accepting new projects and consultations, for both short-term and long-term engagements";
const PRICING: &str = "Pricing is project-based and depends on scope, complexity and timeline. Hourly rates and fixed-price packages are available. Book a free consultation for a detailed quote";

// ── Topics ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Greeting,
    Services,
    Skills,
    Expertise,
    Experience,
    Availability,
    Contact,
    Pricing,
    Process,
    Design,
    Development,
    Marketing,
    Timeline,
    Industries,
    Deliverables,
    WhyChoose,
    Technologies,
    WordPress,
    Mobile,
    Support,
    Consultation,
    GettingStarted,
    Thanks,
    Goodbye,
    Fallback,
}

enum Matcher {
    /// Pattern anchored at the start of the message.
    Prefix(&'static Regex),
    Keywords(&'static [&'static str]),
}

// Order matters: the first matching rule wins.
fn rules() -> [(Topic, Matcher); 24] {
    use Matcher::*;
    [
        (Topic::Greeting, Prefix(&GREETING)),
        (Topic::Services, Keywords(&["service", "what do you do", "what can you do", "offer"])),
        (Topic::Skills, Keywords(&["skill", "technology", "tech stack", "tools", "software"])),
        (Topic::Expertise, Keywords(&["expert", "speciali", "good at", "best at"])),
        (Topic::Experience, Keywords(&["experience", "portfolio", "work", "projects", "clients"])),
        (Topic::Availability, Keywords(&["available", "hire", "freelance", "book", "start"])),
        (Topic::Contact, Keywords(&["contact", "reach", "email", "phone", "whatsapp", "call"])),
        (Topic::Pricing, Keywords(&["price", "cost", "rate", "budget", "fee", "charge"])),
        (Topic::Process, Keywords(&["process", "workflow", "how do you work", "methodology", "approach"])),
        (Topic::Design, Keywords(&["design", "ui", "ux", "user interface", "user experience"])),
        (Topic::Development, Keywords(&["develop", "website", "web app", "build", "code"])),
        (Topic::Marketing, Keywords(&["market", "seo", "digital", "traffic", "ranking", "google"])),
        (Topic::Timeline, Keywords(&["timeline", "how long", "duration", "time", "fast", "quick"])),
        (Topic::Industries, Keywords(&["industry", "sector", "niche", "ecommerce", "e-commerce", "saas", "healthcare"])),
        (Topic::Deliverables, Keywords(&["deliver", "get", "receive", "include", "package"])),
        (Topic::WhyChoose, Keywords(&["why", "benefit", "advantage", "different", "better"])),
        (Topic::Technologies, Keywords(&["react", "next", "node"])),
        (Topic::WordPress, Keywords(&["wordpress", "wp", "cms"])),
        (Topic::Mobile, Keywords(&["mobile", "app", "ios", "android"])),
        (Topic::Support, Keywords(&["support", "maintenance", "update", "fix", "help after"])),
        (Topic::Consultation, Keywords(&["consult", "meeting", "discuss", "talk"])),
        (Topic::GettingStarted, Keywords(&["start", "begin", "first step", "get going"])),
        (Topic::Thanks, Keywords(&["thank", "thanks", "appreciate"])),
        (Topic::Goodbye, Prefix(&GOODBYE)),
    ]
}

/// Pick the topic for a visitor message.
pub fn classify(message: &str) -> Topic {
    let msg = message.trim().to_lowercase();
    for (topic, matcher) in rules() {
        let hit = match matcher {
            Matcher::Prefix(re) => re.is_match(&msg),
            Matcher::Keywords(words) => words.iter().any(|w| msg.contains(w)),
        };
        if hit {
            return topic;
        }
    }
    Topic::Fallback
}

/// Whether the visitor should be asked for their details after
/// `question_count` questions.
pub fn should_ask_for_contact(question_count: u32) -> bool {
    question_count >= QUESTIONS_BEFORE_CONTACT
}

fn bullets(items: &[&str], mark: &str) -> String {
    items
        .iter()
        .map(|i| format!("{} {}", mark, i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The assistant, speaking on behalf of the site owner.
#[derive(Debug, Clone)]
pub struct Assistant {
    owner: String,
}

impl Assistant {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
        }
    }

    /// Reply to one visitor message.
    pub fn respond(&self, message: &str) -> String {
        self.reply(classify(message))
    }

    pub fn reply(&self, topic: Topic) -> String {
        let owner = &self.owner;
        match topic {
            Topic::Greeting => format!(
                "Hello! 👋 I'm Aura, {owner}'s assistant. I can tell you about services, expertise, \
                 the portfolio and how to get your project started. Ask me anything about web \
                 development, design or digital marketing!"
            ),
            Topic::Services => format!(
                "{owner} offers a wide range of services:\n\n{}\n\nEach service is tailored to your \
                 goals. Which one interests you most?",
                bullets(SERVICES, "•")
            ),
            Topic::Skills => format!(
                "{owner} works with a broad set of modern technologies:\n\n{}\n\nWant to know more \
                 about any of them?",
                bullets(SKILLS, "•")
            ),
            Topic::Expertise => format!(
                "{owner} specializes in:\n\n{}\n\n{EXPERIENCE}\n\nWhat type of project are you planning?",
                bullets(EXPERTISE, "•")
            ),
            Topic::Experience => format!(
                "{EXPERIENCE}.\n\nIndustries served:\n{}\n\nFeatured projects are in the portfolio \
                 section. Interested in a specific type of project?",
                bullets(&INDUSTRIES[..5], "•")
            ),
            Topic::Availability => format!(
                "{AVAILABILITY}.\n\nWhat you can expect:\n{}\n\nReady to discuss your project? Book a \
                 free consultation or send a message through the contact form!",
                bullets(&WHY_CHOOSE[..4], "•")
            ),
            Topic::Contact => format!(
                "You can reach {owner} through:\n\n• The contact form at the bottom of this page\n\
                 • Email: see the contact section\n• WhatsApp: quick consultations available\n\n\
                 Response time: within 24 hours ✓\n\nI can also take your details right here!"
            ),
            Topic::Pricing => format!(
                "{PRICING}.\n\nTypical project ranges:\n• Landing page: competitive starting rates\n\
                 • Full website: custom quote based on features\n• E-commerce: depends on products \
                 and integrations\n• Mobile app: based on complexity and platforms\n\nBook a free \
                 consultation for a detailed, transparent quote."
            ),
            Topic::Process => {
                let details = PROCESS_DETAILS
                    .iter()
                    .map(|(phase, what)| format!("• {}: {}", phase, what))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "{owner} follows a proven process:\n\n{PROCESS}\n\nEach phase includes:\n{details}\n\n\
                     Want to know more about any phase?"
                )
            }
            Topic::Design => format!(
                "{owner} does user-centered design that balances looks and function:\n\n\
                 • Modern, clean interface design\n• User research and personas\n\
                 • Wireframing and interactive prototyping\n• Design systems and component libraries\n\
                 • Accessible, inclusive design\n• Mobile-first responsive layouts\n\n\
                 Tools: Figma, Adobe XD, Sketch and more.\n\nLooking for UI/UX design for your project?"
            ),
            Topic::Development => format!(
                "{owner} builds modern, high-performance web applications:\n\n\
                 • Responsive websites\n• Single Page Applications (SPA)\n• Progressive Web Apps (PWA)\n\
                 • E-commerce platforms\n• Custom CMS solutions\n• API development and integration\n\n\
                 Tech stack: React, Next.js, Node.js and more.\n\nWhat are you planning to build?"
            ),
            Topic::Marketing => "Digital marketing and SEO services include:\n\n\
                 • Technical SEO\n• On-page and off-page SEO\n• Keyword research and strategy\n\
                 • Content marketing\n• Social media marketing\n• Google Analytics setup and analysis\n\
                 • Conversion rate optimization\n• Email marketing campaigns\n\n\
                 Grow your visibility, traffic and conversions!"
                .to_string(),
            Topic::Timeline => format!(
                "Project timelines depend on scope:\n\n{}\n\nRush projects are possible with proper \
                 planning. Timelines cover design, development, testing and launch.\n\nWhat do you \
                 have in mind?",
                bullets(TIMELINES, "•")
            ),
            Topic::Industries => format!(
                "{owner} has worked across many industries:\n\n{}\n\nEvery project is shaped to its \
                 industry. Which one is yours?",
                bullets(INDUSTRIES, "•")
            ),
            Topic::Deliverables => format!(
                "When you work with {owner}, you receive:\n\n{}\n\nEverything you need for launch and beyond!",
                bullets(DELIVERABLES, "✓")
            ),
            Topic::WhyChoose => format!(
                "Why choose {owner}:\n\n{}\n\nClient satisfaction comes first, with a focus on \
                 measurable results!",
                bullets(WHY_CHOOSE, "✓")
            ),
            Topic::Technologies => format!(
                "Yes! {owner} is highly proficient in modern JavaScript frameworks:\n\n\
                 • React for dynamic, component-based UIs\n• Next.js for server-side rendering\n\
                 • Node.js for scalable backends\n• TypeScript for maintainable code\n\n\
                 Need a React or Next.js project?"
            ),
            Topic::WordPress => "WordPress services include:\n\n• Custom theme development\n\
                 • Plugin development and customization\n• WooCommerce setup\n\
                 • Site migration and maintenance\n• Performance optimization\n• Security hardening\n\
                 • SEO configuration\n\nWould a WordPress solution suit you?"
                .to_string(),
            Topic::Mobile => "Mobile app design and development:\n\n• Native iOS and Android design\n\
                 • Responsive web apps (PWA)\n• Cross-platform solutions\n• User-friendly interfaces\n\
                 • Performance optimization\n• App store guideline compliance\n\nPlanning a mobile app?"
                .to_string(),
            Topic::Support => "Post-launch support and maintenance includes:\n\n\
                 • Bug fixes and troubleshooting\n• Feature updates\n• Security updates\n\
                 • Performance monitoring\n• Content updates\n• Technical support\n• Regular backups\n\n\
                 Ongoing support packages keep your site running smoothly!"
                .to_string(),
            Topic::Consultation => "A free consultation covers:\n\n• Your business goals\n\
                 • Project requirements\n• Design preferences\n• Technical options\n\
                 • Timeline and budget\n• All your questions\n\n\
                 No obligation, just a friendly chat. Ready to schedule one?"
                .to_string(),
            Topic::GettingStarted => "Getting started is easy:\n\n\
                 1. Share your project details via the contact form\n2. Schedule a free consultation\n\
                 3. Receive a detailed proposal and quote\n4. Review and approve the plan\n\
                 5. Kick off the project!\n\nSend a message through the contact form, or I can take \
                 your details here."
                .to_string(),
            Topic::Thanks => format!(
                "You're very welcome! 😊 If you have more questions about {owner}'s services or \
                 projects, just ask."
            ),
            Topic::Goodbye => "Thanks for chatting! If you want to discuss your project later, I'm \
                 always here, or use the contact form. Have a great day! 👋"
                .to_string(),
            Topic::Fallback => "Good question! I can help with:\n\n\
                 • Services (design, development, marketing)\n• Technologies and skills\n\
                 • Project process and timeline\n• Pricing and packages\n• Portfolio and past work\n\
                 • How to get started\n\nWhat would you like to know? Feel free to rephrase your question!"
                .to_string(),
        }
    }
}
