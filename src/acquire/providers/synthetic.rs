// src/acquire/providers/synthetic.rs
//! Deterministic placeholder listings, used last to fill any shortfall.
//!
//! No I/O and no randomness: the pools are picked by role family and the
//! rotation offset comes from a sha2 digest of the query, so the same
//! `(query, location, slot)` always yields the same record. Slots map to
//! distinct `(title, company)` pairs, so one run never repeats itself.

use sha2::{Digest, Sha256};

use crate::acquire::normalize::{stable_id, title_case};
use crate::acquire::types::JobRecord;

pub const NAME: &str = "synthetic";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFamily {
    DataEngineering,
    DataAnalysis,
    AiMl,
    Frontend,
    Backend,
    Software,
    Healthcare,
    Education,
    Finance,
    Generic,
}

struct Pool {
    companies: &'static [&'static str],
    titles: Vec<String>,
    blurb: &'static str,
}

pub fn classify(query: &str) -> RoleFamily {
    let q = query.to_lowercase();
    let words: Vec<&str> = q
        .split(|c: char| !c.is_alphanumeric() && c != '/')
        .filter(|w| !w.is_empty())
        .collect();
    let has_word = |w: &str| words.contains(&w);
    let has = |s: &str| q.contains(s);

    if has("data engineer") || has("etl") || has("pipeline") {
        RoleFamily::DataEngineering
    } else if has("analyst") || has("analytics") || has_word("bi") {
        RoleFamily::DataAnalysis
    } else if has_word("ai") || has_word("ml") || has("machine learning") || has_word("llm") {
        RoleFamily::AiMl
    } else if has("frontend") || has("front-end") || has("front end") || has_word("react") || has_word("ui") {
        RoleFamily::Frontend
    } else if has("backend") || has("back-end") || has("back end") || has_word("api") {
        RoleFamily::Backend
    } else if has("software") || has("developer") || has("engineer") || has("programmer") {
        RoleFamily::Software
    } else if has("health") || has("medical") || has("clinical") || has("nurse") {
        RoleFamily::Healthcare
    } else if has("teacher") || has("educat") || has("tutor") {
        RoleFamily::Education
    } else if has("accountant") || has("financ") || has("audit") {
        RoleFamily::Finance
    } else {
        RoleFamily::Generic
    }
}

fn fixed(titles: &[&str]) -> Vec<String> {
    titles.iter().map(|t| t.to_string()).collect()
}

fn around(role: &str, variants: &[&str]) -> Vec<String> {
    variants.iter().map(|v| v.replace("{}", role)).collect()
}

fn pool(family: RoleFamily, query: &str) -> Pool {
    let role = match query.trim() {
        "" | "jobs" => "Associate".to_string(),
        q => title_case(&q.to_lowercase()),
    };
    match family {
        RoleFamily::DataEngineering => Pool {
            companies: &[
                "Amazon Web Services", "Google Cloud", "Microsoft Azure", "Snowflake", "Databricks",
                "Stripe", "Airbnb", "Uber", "Netflix", "Spotify", "Meta", "Apple", "Oracle", "IBM",
            ],
            titles: fixed(&[
                "Senior Data Engineer", "Data Engineer", "Big Data Engineer", "Cloud Data Engineer",
                "ETL Data Engineer", "Data Pipeline Engineer", "Data Infrastructure Engineer",
                "Data Platform Engineer", "Data Warehouse Engineer", "Real-time Data Engineer",
            ]),
            blurb: "Build and operate batch and streaming pipelines with Python, SQL, Spark, Airflow and Kafka on AWS.",
        },
        RoleFamily::DataAnalysis => Pool {
            companies: &[
                "JP Morgan", "Goldman Sachs", "McKinsey", "Deloitte", "PwC", "Accenture",
                "Salesforce", "Tableau", "Looker", "Palantir", "Bloomberg", "Reuters",
            ],
            titles: fixed(&[
                "Data Analyst", "Business Data Analyst", "Senior Data Analyst", "Financial Data Analyst",
                "Marketing Data Analyst", "Product Data Analyst", "BI Data Analyst", "Analytics Engineer",
            ]),
            blurb: "Turn business questions into SQL, dashboards in Tableau or Power BI, and pandas analyses.",
        },
        RoleFamily::AiMl => Pool {
            companies: &[
                "OpenAI", "Anthropic", "Google DeepMind", "Microsoft Research", "Meta AI",
                "Tesla", "NVIDIA", "Hugging Face", "Cohere", "Stability AI", "Scale AI",
            ],
            titles: fixed(&[
                "AI Engineer", "ML Engineer", "Machine Learning Engineer", "Deep Learning Engineer",
                "AI Research Engineer", "LLM Engineer", "MLOps Engineer", "AI Infrastructure Engineer",
            ]),
            blurb: "Train, evaluate and serve models with Python, PyTorch and TensorFlow; deploy with Docker and Kubernetes.",
        },
        RoleFamily::Frontend => Pool {
            companies: &[
                "Vercel", "Netlify", "Shopify", "Stripe", "Figma", "Adobe", "Canva", "Notion", "Linear",
            ],
            titles: fixed(&[
                "Frontend Engineer", "React Developer", "Frontend Developer", "UI Engineer",
                "Frontend Software Engineer", "Web Developer", "JavaScript Engineer",
            ]),
            blurb: "Ship accessible interfaces in React and TypeScript with HTML, CSS and Jest tests.",
        },
        RoleFamily::Backend => Pool {
            companies: &[
                "AWS", "Google Cloud", "Microsoft Azure", "MongoDB", "Redis", "PostgreSQL",
                "Stripe", "Twilio", "SendGrid", "Auth0", "Okta", "Cloudflare",
            ],
            titles: fixed(&[
                "Backend Engineer", "Backend Developer", "API Engineer", "Server Engineer",
                "Backend Software Engineer", "Systems Engineer", "Infrastructure Engineer",
            ]),
            blurb: "Design REST and gRPC services backed by PostgreSQL and Redis, running on Docker and Kubernetes.",
        },
        RoleFamily::Software => Pool {
            companies: &[
                "Google", "Microsoft", "Apple", "Meta", "Amazon", "Netflix", "Uber", "Lyft",
                "Stripe", "Square", "Shopify", "Twilio", "Atlassian", "GitHub", "GitLab",
            ],
            titles: fixed(&[
                "Software Engineer", "Senior Software Engineer", "Full Stack Engineer",
                "Backend Engineer", "Frontend Engineer", "Software Developer", "Platform Engineer",
            ]),
            blurb: "Write, test and operate production services in Python, Java or Go with Git, SQL and CI/CD.",
        },
        RoleFamily::Healthcare => Pool {
            companies: &[
                "Mayo Clinic", "Cleveland Clinic", "Johns Hopkins", "Mass General", "Kaiser Permanente",
                "UnitedHealth Group", "CVS Health", "Walgreens", "Quest Diagnostics", "LabCorp",
            ],
            titles: around(&role, &[
                "{}", "Senior {}", "{} - Full Time", "{} - Part Time", "{} - Remote", "{} - On-site",
            ]),
            blurb: "Support patient care and clinical operations in a regulated healthcare setting.",
        },
        RoleFamily::Education => Pool {
            companies: &[
                "New York City Department of Education", "Los Angeles Unified", "Chicago Public Schools",
                "Khan Academy", "Coursera", "EdX", "Udemy", "Teach for America", "KIPP",
            ],
            titles: around(&role, &[
                "{}", "Senior {}", "{} - Elementary", "{} - Middle School", "{} - High School",
                "{} - Special Education",
            ]),
            blurb: "Plan and deliver instruction, assess progress and work with families and colleagues.",
        },
        RoleFamily::Finance => Pool {
            companies: &[
                "Deloitte", "PwC", "EY", "KPMG", "JP Morgan", "Goldman Sachs", "Morgan Stanley",
                "Bank of America", "Wells Fargo", "Citigroup", "American Express",
            ],
            titles: around(&role, &[
                "{}", "Senior {}", "{} - CPA", "{} - Tax", "{} - Audit", "{} - Financial Planning",
            ]),
            blurb: "Prepare statements, reconcile accounts and model forecasts in Excel and SQL.",
        },
        RoleFamily::Generic => Pool {
            companies: &[
                "Tech Corp", "Data Solutions", "Analytics Inc", "Cloud Services", "Digital Innovations",
                "Innovation Labs", "Tech Solutions", "Data Systems", "Cloud Platform", "Digital Services",
            ],
            titles: around(&role, &[
                "{}", "Senior {}", "{} II", "Lead {}", "{} - Remote", "{} - Full Time",
            ]),
            blurb: "Collaborate with a cross-functional team to deliver on core business goals.",
        },
    }
}

fn seed_of(query: &str) -> u64 {
    let digest = Sha256::digest(query.trim().to_lowercase().as_bytes());
    let mut b = [0u8; 8];
    b.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(b)
}

#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    url_base: String,
}

impl SyntheticGenerator {
    pub fn new(url_base: &str) -> Self {
        Self {
            url_base: url_base.trim_end_matches('/').to_string(),
        }
    }

    /// Records for slots `start .. start + count`. Continuing from the last
    /// slot on a later call never repeats an earlier pair.
    pub fn generate(&self, query: &str, location: &str, start: usize, count: usize) -> Vec<JobRecord> {
        let family = classify(query);
        let pool = pool(family, query);
        let c = pool.companies.len();
        let t = pool.titles.len();
        let cycle_len = c * t;
        let seed = seed_of(query);
        let company_off = (seed % c as u64) as usize;
        let title_off = ((seed >> 32) % t as u64) as usize;
        let location = match location.trim() {
            l if l.is_empty() || l.eq_ignore_ascii_case("us") => "Remote".to_string(),
            l => l.to_string(),
        };

        (start..start + count)
            .map(|slot| {
                let within = slot % cycle_len;
                let round = slot / cycle_len;
                let company = pool.companies[(within % c + company_off) % c];
                let base_title = &pool.titles[(within / c + title_off) % t];
                let title = if round == 0 {
                    base_title.clone()
                } else {
                    format!("{base_title} (Req. {})", round + 1)
                };
                let id = format!("syn-{}", stable_id(&[query, company, &slot.to_string()]));
                JobRecord {
                    url: format!("{}/{}", self.url_base, id),
                    id,
                    title: title.clone(),
                    company: company.to_string(),
                    location: location.clone(),
                    description: format!("{title} at {company}. {}", pool.blurb),
                    source: NAME.to_string(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquire::normalize::{dedup_records, is_banned_url};

    fn generator() -> SyntheticGenerator {
        SyntheticGenerator::new("https://www.linkedin.com/jobs/view/")
    }

    #[test]
    fn classifies_families() {
        assert_eq!(classify("Senior Data Engineer"), RoleFamily::DataEngineering);
        assert_eq!(classify("BI analyst"), RoleFamily::DataAnalysis);
        assert_eq!(classify("AI engineer"), RoleFamily::AiMl);
        assert_eq!(classify("email marketing"), RoleFamily::Generic);
        assert_eq!(classify("React developer"), RoleFamily::Frontend);
        assert_eq!(classify("rust developer"), RoleFamily::Software);
        assert_eq!(classify("registered nurse"), RoleFamily::Healthcare);
        assert_eq!(classify("math teacher"), RoleFamily::Education);
        assert_eq!(classify("staff accountant"), RoleFamily::Finance);
    }

    #[test]
    fn deterministic_and_remote_for_us() {
        let a = generator().generate("data engineer", "US", 0, 10);
        let b = generator().generate("data engineer", "US", 0, 10);
        assert_eq!(a, b);
        assert!(a.iter().all(|j| j.location == "Remote" && j.source == NAME));
        assert!(a.iter().all(|j| !is_banned_url(&j.url)));
        assert!(a[0].url.starts_with("https://www.linkedin.com/jobs/view/syn-"));
    }

    #[test]
    fn keeps_explicit_location() {
        let jobs = generator().generate("nurse", "Boston, MA", 0, 2);
        assert!(jobs.iter().all(|j| j.location == "Boston, MA"));
        assert!(jobs[0].title.contains("Nurse"));
    }

    #[test]
    fn no_internal_duplicates_past_one_cycle() {
        // Frontend pool: 9 companies x 7 titles = 63 pairs.
        let jobs = generator().generate("frontend", "US", 0, 150);
        let (kept, dropped) = dedup_records(jobs);
        assert_eq!(dropped, 0);
        assert_eq!(kept.len(), 150);
    }

    #[test]
    fn continuing_slots_do_not_repeat() {
        let g = generator();
        let mut all = g.generate("backend", "Berlin", 0, 7);
        all.extend(g.generate("backend", "Berlin", 7, 7));
        let (_, dropped) = dedup_records(all);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn empty_query_still_generates() {
        let jobs = generator().generate("jobs", "", 0, 3);
        assert_eq!(jobs.len(), 3);
        assert!(jobs.iter().all(|j| !j.title.is_empty()));
    }
}
