//! GraphQL documents for the Shopify Storefront API.
//!
//! All documents take their inputs through GraphQL variables.

/// Product fields shared by listing and search.
macro_rules! product_fields {
    () => {
        r"
            id
            title
            description
            descriptionHtml
            vendor
            productType
            tags
            variants(first: 10) {
                edges {
                    node {
                        id
                        title
                        priceV2 { amount currencyCode }
                        compareAtPriceV2 { amount currencyCode }
                        sku
                        availableForSale
                        quantityAvailable
                    }
                }
            }
            images(first: 5) {
                edges {
                    node { id url altText }
                }
            }
        "
    };
}

/// Paginated product listing with optional search text.
pub const GET_PRODUCTS: &str = concat!(
    r"
    query GetProducts($first: Int!, $after: String, $query: String) {
        products(first: $first, after: $after, query: $query) {
            edges {
                cursor
                node {",
    product_fields!(),
    r"
                }
            }
            pageInfo { hasNextPage endCursor }
        }
    }
"
);

/// Create a customer account.
pub const CUSTOMER_CREATE: &str = r"
    mutation CustomerCreate($input: CustomerCreateInput!) {
        customerCreate(input: $input) {
            customer { id email firstName lastName acceptsMarketing }
            customerUserErrors { field message code }
        }
    }
";

/// Exchange email and password for a customer access token.
pub const CUSTOMER_ACCESS_TOKEN_CREATE: &str = r"
    mutation CustomerAccessTokenCreate($input: CustomerAccessTokenCreateInput!) {
        customerAccessTokenCreate(input: $input) {
            customerAccessToken { accessToken expiresAt }
            customerUserErrors { field message code }
        }
    }
";

/// Send a password reset email.
pub const CUSTOMER_RECOVER: &str = r"
    mutation CustomerRecover($email: String!) {
        customerRecover(email: $email) {
            customerUserErrors { field message code }
        }
    }
";

/// Customer profile, addresses and recent orders for an access token.
pub const GET_CUSTOMER: &str = r"
    query GetCustomer($customerAccessToken: String!) {
        customer(customerAccessToken: $customerAccessToken) {
            id
            email
            firstName
            lastName
            phone
            acceptsMarketing
            defaultAddress {
                id address1 address2 city province country zip phone firstName lastName
            }
            addresses(first: 10) {
                edges {
                    node {
                        id address1 address2 city province country zip phone firstName lastName
                    }
                }
            }
            orders(first: 10, reverse: true) {
                edges {
                    node {
                        id
                        orderNumber
                        processedAt
                        financialStatus
                        fulfillmentStatus
                        totalPrice { amount currencyCode }
                        lineItems(first: 10) {
                            edges {
                                node { title quantity }
                            }
                        }
                    }
                }
            }
        }
    }
";
