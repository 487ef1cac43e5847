//! Fixed texts the assistant sends or returns

/// Returned on a user's first message, whatever it says
pub const INTRODUCTION: &str = "Hello! I'm your financial assistant bot. I can help summarize information, answer queries, and fetch live data. How can I help you today?";

/// Returned when the classifier rejects a message as off-topic
pub const REFUSAL: &str = "I'm designed to handle finance-related questions only. Please refer to another resource for non-finance topics.";

/// Messages recognised as a plain greeting
pub const GREETINGS: [&str; 4] = ["hi", "hello", "hey", "hola"];

/// Substrings that make a message worth a live web search
pub const SEARCH_TRIGGERS: [&str; 6] = ["stock", "market", "finance", "price", "invest", "stocks"];

pub const SEARCH_INSTRUCTION: &str = "You are a financial assistant. The query below contains live web search results, \
each followed by its source link. Use them to answer the user's question directly, in your own words; \
do not present the answer as a summary of search results. Cite the sources you rely on as links. \
When the question concerns companies or sectors, recommend relevant stock tickers. \
End with two or three potential follow-up questions the user might ask next.";

pub const DIRECT_INSTRUCTION: &str = "You are a financial advice assistant. Answer the user's question \
clearly and accurately from your own knowledge of personal finance, markets and economics.";

pub const CLASSIFIER_INSTRUCTION: &str = "You are a strict topic classifier. Decide whether a user \
question is about finance: money, banking, budgeting, investing, stocks, markets, trading, crypto, \
economics, taxes, loans or companies' financial performance. Reply with exactly one word: yes or no.";

/// Wraps a user message in the yes/no classification question
pub fn classifier_query(message: &str) -> String {
    format!(
        "Is the following question related to finance? Answer only 'yes' or 'no'.\n\nQuestion: {}",
        message
    )
}
