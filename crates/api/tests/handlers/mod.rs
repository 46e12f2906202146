mod availability_test;
mod middleware_test;
mod router_test;
